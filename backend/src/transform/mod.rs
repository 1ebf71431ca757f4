//! Transformation module.
//!
//! - Dates: appearance → game date join and date parsing
//! - Stints: per player/club spell segmentation
//! - Grouper: per-stint aggregation
//! - Enrich: club and competition context
//! - Transfers: fee cleaning, EPL filter, age at transfer
//! - Pipeline: orchestration of all stages

pub mod dates;
pub mod enrich;
pub mod grouper;
pub mod pipeline;
pub mod stints;
pub mod transfers;

pub use grouper::aggregate_stints;
pub use pipeline::*;
pub use stints::segment_stints;
