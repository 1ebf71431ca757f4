//! High-level pipeline API.
//!
//! Loads the six input tables, derives both result tables and writes them.
//!
//! # Example
//!
//! ```rust,ignore
//! use tpp::{run_pipeline, PipelineOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = PipelineOptions {
//!         input_dir: "data".into(),
//!         output_dir: "out".into(),
//!         ..PipelineOptions::default()
//!     };
//!     let summary = run_pipeline(&options)?;
//!     println!("{} stints, {} EPL arrivals", summary.stat_rows, summary.epl_arrivals);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::dates::attach_game_dates;
use super::enrich::{enrich_player_stats, ReferenceIndex};
use super::grouper::aggregate_stints;
use super::stints::{segment_stints, DEFAULT_STINT_GAP_DAYS};
use super::transfers::{
    attach_ages, build_transfer_context, filter_epl_arrivals, sort_arrivals, PREMIER_LEAGUE_ID,
};
use crate::error::{PipelineError, PipelineResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning, LogEntry};
use crate::models::{
    Appearance, Club, Competition, EnrichedTransfer, FinalPlayerStats, Game, InputTable, Player,
    Transfer,
};
use crate::parser::read_table;
use crate::writer::{select_arrival_columns, write_outputs};

/// Options for the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Directory holding the six input CSV files
    pub input_dir: PathBuf,

    /// Directory receiving the two output files (created if absent)
    pub output_dir: PathBuf,

    /// Gap in days above which a new stint starts
    pub stint_gap_days: i64,

    /// Competition id treated as the Premier League
    pub epl_competition_id: String,

    /// Input delimiter; auto-detected per file when `None`
    pub delimiter: Option<char>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            stint_gap_days: DEFAULT_STINT_GAP_DAYS,
            epl_competition_id: PREMIER_LEAGUE_ID.to_string(),
            delimiter: None,
        }
    }
}

/// All six input relations, fully loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub appearances: Vec<Appearance>,
    pub games: Vec<Game>,
    pub clubs: Vec<Club>,
    pub competitions: Vec<Competition>,
    pub transfers: Vec<Transfer>,
    pub players: Vec<Player>,
    /// Header row of `transfers.csv`, used to pick optional output columns
    pub transfer_headers: Vec<String>,
}

/// Row counts and outputs of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineSummary {
    pub appearances: usize,
    pub games: usize,
    pub clubs: usize,
    pub competitions: usize,
    pub transfers: usize,
    pub players: usize,
    /// Appearances left out of stints because their game date is unknown
    pub appearances_without_date: usize,
    pub stat_rows: usize,
    pub end_of_loan_excluded: usize,
    pub transfers_without_date: usize,
    pub epl_arrivals: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_stats_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epl_arrivals_path: Option<PathBuf>,
}

/// Both derived relations, ready to write
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub player_stats: Vec<FinalPlayerStats>,
    pub epl_arrivals: Vec<EnrichedTransfer>,
    pub arrival_columns: Vec<&'static str>,
    pub summary: PipelineSummary,
}

/// Summary plus log history, as written by `--report`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub options: PipelineOptions,
    pub summary: PipelineSummary,
    pub warnings: usize,
    pub log: Vec<LogEntry>,
}

/// Paths of the six inputs, in load order.
pub fn input_paths(dir: &Path) -> Vec<PathBuf> {
    [
        Appearance::FILE_NAME,
        Club::FILE_NAME,
        Competition::FILE_NAME,
        Game::FILE_NAME,
        Transfer::FILE_NAME,
        Player::FILE_NAME,
    ]
    .iter()
    .map(|name| dir.join(name))
    .collect()
}

/// Fail on the first absent input before anything is read.
pub fn check_inputs(dir: &Path) -> PipelineResult<()> {
    match input_paths(dir).into_iter().find(|p| !p.is_file()) {
        Some(missing) => Err(PipelineError::MissingInput(missing)),
        None => Ok(()),
    }
}

/// Load every input table from `options.input_dir`.
pub fn load_dataset(options: &PipelineOptions) -> PipelineResult<Dataset> {
    let dir = options.input_dir.as_path();
    check_inputs(dir)?;

    log_info(format!("📖 Loading datasets from {}", dir.display()));

    let appearances = read_table::<Appearance>(dir, options.delimiter)?;
    log_success(format!("{}: {} rows ({})", Appearance::NAME, appearances.records.len(), appearances.encoding));
    let clubs = read_table::<Club>(dir, options.delimiter)?;
    log_success(format!("{}: {} rows", Club::NAME, clubs.records.len()));
    let competitions = read_table::<Competition>(dir, options.delimiter)?;
    log_success(format!("{}: {} rows", Competition::NAME, competitions.records.len()));
    let games = read_table::<Game>(dir, options.delimiter)?;
    log_success(format!("{}: {} rows", Game::NAME, games.records.len()));
    let transfers = read_table::<Transfer>(dir, options.delimiter)?;
    log_success(format!("{}: {} rows", Transfer::NAME, transfers.records.len()));
    if !transfers.has_column("player_name") {
        log_info_indent("no player_name column, arrivals are written without names", 1);
    }
    let players = read_table::<Player>(dir, options.delimiter)?;
    log_success(format!("{}: {} rows", Player::NAME, players.records.len()));

    Ok(Dataset {
        appearances: appearances.records,
        games: games.records,
        clubs: clubs.records,
        competitions: competitions.records,
        transfer_headers: transfers.headers,
        transfers: transfers.records,
        players: players.records,
    })
}

/// Derive both result relations from a loaded dataset. Pure: no IO.
pub fn transform_dataset(dataset: Dataset, options: &PipelineOptions) -> PipelineOutput {
    let Dataset {
        appearances,
        games,
        clubs,
        competitions,
        transfers,
        players,
        transfer_headers,
    } = dataset;

    let mut summary = PipelineSummary {
        appearances: appearances.len(),
        games: games.len(),
        clubs: clubs.len(),
        competitions: competitions.len(),
        transfers: transfers.len(),
        players: players.len(),
        ..PipelineSummary::default()
    };

    log_info("🗓️  Processing dates and segmenting stints...");
    let dated = attach_game_dates(appearances, &games);
    let segmentation = segment_stints(dated, options.stint_gap_days);
    summary.appearances_without_date = segmentation.undated;
    if segmentation.undated > 0 {
        log_warning(format!(
            "{} appearances have no match date and were left out of stints",
            segmentation.undated
        ));
    }
    log_success(format!(
        "{} stints (gap > {} days starts a new one)",
        segmentation.stint_count(),
        options.stint_gap_days
    ));
    log_info_indent(format!("{} dated appearances segmented", segmentation.rows.len()), 1);

    log_info("📊 Aggregating stint statistics...");
    let stint_stats = aggregate_stints(&segmentation.rows);

    log_info("🌍 Merging club and country information...");
    let index = ReferenceIndex::new(&clubs, &competitions);
    let player_stats = enrich_player_stats(stint_stats, &index);
    summary.stat_rows = player_stats.len();
    log_success(format!("{} player/club/stint rows", player_stats.len()));

    log_info("🔁 Building transfer context...");
    let context = build_transfer_context(transfers, &index);
    summary.end_of_loan_excluded = context.end_of_loan_excluded;
    summary.transfers_without_date = context.undated;
    if context.end_of_loan_excluded > 0 {
        log_info(format!("{} end-of-loan rows excluded", context.end_of_loan_excluded));
    }
    if context.undated > 0 {
        log_warning(format!("{} transfers have neither a date nor a usable season", context.undated));
    }

    log_info("🏴 Filtering for Premier League arrivals...");
    let arrivals = filter_epl_arrivals(context.rows, &options.epl_competition_id);
    let mut epl_arrivals = attach_ages(arrivals, &players);
    sort_arrivals(&mut epl_arrivals);
    summary.epl_arrivals = epl_arrivals.len();
    log_success(format!("{} Premier League arrivals", epl_arrivals.len()));

    PipelineOutput {
        player_stats,
        epl_arrivals,
        arrival_columns: select_arrival_columns(&transfer_headers),
        summary,
    }
}

/// Run the whole pipeline: load, transform, write.
///
/// Aborts before reading anything when an input file is missing, and
/// writes either both outputs or none.
pub fn run_pipeline(options: &PipelineOptions) -> PipelineResult<PipelineSummary> {
    let dataset = load_dataset(options)?;
    let output = transform_dataset(dataset, options);

    log_info("💾 Saving outputs...");
    let paths = write_outputs(
        &options.output_dir,
        &output.player_stats,
        &output.epl_arrivals,
        &output.arrival_columns,
    )?;
    log_success(format!("{}", paths.player_stats.display()));
    log_success(format!("{}", paths.epl_arrivals.display()));

    let mut summary = output.summary;
    summary.player_stats_path = Some(paths.player_stats);
    summary.epl_arrivals_path = Some(paths.epl_arrivals);
    Ok(summary)
}

/// Serialize a run report as pretty JSON.
pub fn write_report(path: &Path, report: &RunReport) -> PipelineResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(crate::error::WriteError::from)?;
    Ok(())
}
