//! Minicube build planner.
//!
//! Reads build specifications, lays out their grids and time chunks and
//! reports the result without contacting any data provider.

mod commands;
mod config_loader;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use minicuber::AssemblerConfig;

#[derive(Parser, Debug)]
#[command(name = "cuber")]
#[command(about = "Plan and validate minicube build specifications")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Grid padding in cells (overrides MINICUBER_PADDING_CELLS)
    #[arg(long, global = true)]
    padding_cells: Option<f64>,

    /// Minimum chunk length in days (overrides MINICUBER_MIN_CHUNK_DAYS)
    #[arg(long, global = true)]
    min_chunk_days: Option<i64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the grid and chunk layout of one specification
    Plan {
        /// Specification file (.yaml or .json)
        file: PathBuf,
    },
    /// Check that specifications parse and can be planned
    Validate {
        /// Specification files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Files checked concurrently
        #[arg(short, long, default_value_t = 4)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries command output
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.with_thread_ids(true).json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let mut config = AssemblerConfig::from_env();
    if let Some(cells) = args.padding_cells {
        config.padding_cells = cells;
    }
    if let Some(days) = args.min_chunk_days {
        config.min_chunk_days = days;
    }
    config.validate()?;

    match args.command {
        Command::Plan { file } => {
            let summary = commands::plan_file(&file, &config)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Validate { files, concurrency } => {
            info!(files = files.len(), "Validating specifications");
            let reports = commands::validate_files(files, &config, concurrency).await;
            for report in &reports {
                println!("{}", serde_json::to_string(report)?);
            }

            let failed = reports.iter().filter(|r| !r.valid).count();
            anyhow::ensure!(
                failed == 0,
                "{} of {} specifications are invalid",
                failed,
                reports.len()
            );
        }
    }

    Ok(())
}
