//! # TPP - player stints and Premier League arrivals
//!
//! Reads a relational football dump (appearances, games, clubs,
//! competitions, transfers, players) and derives two tables:
//! per player/club/stint statistics with league context, and transfers
//! into the Premier League with both clubs' context and the player's age.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌──────────────────────────┐
//! │  6 CSV files│────▶│   Parser    │────▶│  Transform   │────▶│ final_player_stats.csv   │
//! │  (auto-enc) │     │ (typed rows)│     │ (stints, EPL)│     │ epl_arrivals_with_...csv │
//! └─────────────┘     └─────────────┘     └──────────────┘     └──────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tpp::{run_pipeline, PipelineOptions};
//!
//! let summary = run_pipeline(&PipelineOptions::default()).unwrap();
//! println!("{} EPL arrivals", summary.epl_arrivals);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Input and derived relations
//! - [`parser`] - CSV loading with auto-detection
//! - [`validation`] - Required column checks
//! - [`transform`] - Stints, aggregation, enrichment, transfers, pipeline
//! - [`writer`] - Output serialization
//! - [`logs`] - Progress log

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod parser;
pub mod validation;

// Transformation
pub mod transform;

// Output
pub mod writer;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, PipelineError, WriteError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Appearance,
    Club,
    Competition,
    EnrichedTransfer,
    FinalPlayerStats,
    Game,
    Player,
    PlayerClubStintStats,
    Transfer,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    detect_delimiter,
    detect_encoding,
    decode_content,
    inspect_file,
    parse_table_bytes,
    read_table,
    ParseResult,
    TableInfo,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::stints::DEFAULT_STINT_GAP_DAYS;
pub use transform::transfers::{clean_fee, is_epl_arrival, CleanedFee, PREMIER_LEAGUE_ID};
pub use transform::pipeline::{
    load_dataset,
    run_pipeline,
    transform_dataset,
    Dataset,
    PipelineOptions,
    PipelineOutput,
    PipelineSummary,
    RunReport,
};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use writer::{write_outputs, EPL_ARRIVALS_FILE, PLAYER_STATS_FILE};
