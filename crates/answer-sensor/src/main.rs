//! Answer sensor
//!
//! Extracts and grades model answers for the puzzle and legal-move tests.
//!
//! Usage:
//!   cargo run -p answer-sensor -- <parse|grade|run> <puzzle|legal>
//!
//! Paths and models come from the environment (or a .env file).

use answer_sensor::batch::{self, Command};
use answer_sensor::config::SensorConfig;
use answer_sensor::dataset::TestMode;
use tracing::info;

const USAGE: &str = "usage: answer-sensor <parse|grade|run> <puzzle|legal>";

/// Parse `<command> <mode>` from CLI args
fn parse_args() -> Option<(Command, TestMode)> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [command, mode] => Some((Command::parse(command)?, TestMode::parse(mode)?)),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let Some((command, mode)) = parse_args() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let config = SensorConfig::load()?;
    info!(?command, ?mode, "Starting batch");

    let report = batch::run_batch(&config, command, mode).await?;

    for summary in &report.summaries {
        println!(
            "{:<20} {:>4} rows  {:>4} errors  {:?}",
            summary.model, summary.rows, summary.errors, summary.counts
        );
    }
    println!(
        "Batch complete: {} succeeded, {} failed",
        report.succeeded, report.failed
    );

    if report.failed > 0 {
        anyhow::bail!("{} model job(s) failed", report.failed);
    }
    Ok(())
}
