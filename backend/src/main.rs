//! TPP CLI - player stints and Premier League arrivals
//!
//! # Main Commands
//!
//! ```bash
//! tpp run --input-dir data --output-dir out     # Build both output tables
//! tpp run --report out/run.json                  # ... and write a JSON run report
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! tpp inspect data/transfers.csv                 # Show encoding, delimiter, headers
//! ```
//!
//! Every `run` flag can also be set through the environment (`TPP_*`),
//! including from a `.env` file in the working directory.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tpp::logs::{log_error, PIPELINE_LOG};
use tpp::transform::pipeline::write_report;
use tpp::{inspect_file, run_pipeline, PipelineOptions, RunReport};

#[derive(Parser)]
#[command(name = "tpp")]
#[command(about = "Player/club stint statistics and Premier League arrivals from football CSV dumps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline
    Run {
        /// Directory with appearances, clubs, competitions, games, transfers and players CSV files
        #[arg(short, long, env = "TPP_INPUT_DIR", default_value = ".")]
        input_dir: PathBuf,

        /// Directory for final_player_stats.csv and epl_arrivals_with_country.csv
        #[arg(short, long, env = "TPP_OUTPUT_DIR", default_value = ".")]
        output_dir: PathBuf,

        /// Days between appearances above which a new stint starts
        #[arg(long, env = "TPP_STINT_GAP_DAYS", default_value = "250")]
        stint_gap_days: i64,

        /// Competition id of the Premier League
        #[arg(long, env = "TPP_EPL_COMPETITION_ID", default_value = "GB1")]
        epl_competition_id: String,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Write a JSON run report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Parse one CSV file and show its shape
    Inspect {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input_dir,
            output_dir,
            stint_gap_days,
            epl_competition_id,
            delimiter,
            report,
        } => {
            let options = PipelineOptions {
                input_dir,
                output_dir,
                stint_gap_days,
                epl_competition_id,
                delimiter,
            };
            cmd_run(&options, report.as_deref())
        }

        Commands::Inspect { input, delimiter } => cmd_inspect(&input, delimiter),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(options: &PipelineOptions, report: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let summary = match run_pipeline(options) {
        Ok(summary) => summary,
        Err(e) => {
            log_error(format!("Pipeline aborted, no output written: {}", e));
            return Err(e.into());
        }
    };

    eprintln!(
        "\n✨ Done! {} stint rows, {} Premier League arrivals",
        summary.stat_rows, summary.epl_arrivals
    );

    if let Some(path) = report {
        let report = RunReport {
            options: options.clone(),
            summary,
            warnings: PIPELINE_LOG.warning_count(),
            log: PIPELINE_LOG.snapshot(),
        };
        write_report(path, &report)?;
        eprintln!("💾 Report written to: {}", path.display());
    }

    Ok(())
}

fn cmd_inspect(input: &Path, delimiter: Option<char>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Inspecting: {}", input.display());

    let info = inspect_file(input, delimiter)?;

    eprintln!("   Encoding: {}", info.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(info.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", info.headers.join(", "));
    eprintln!("✅ {} rows", info.row_count);

    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
