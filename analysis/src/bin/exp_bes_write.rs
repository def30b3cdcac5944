use anyhow::Context;
use clap::Parser;
use gs2_analysis::{run::Run, summary};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Instant;

/// Writes the heat-flux and fluctuation summary of a GS2 run
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLineArguments {
    /// Path to the run toml
    run: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    // Start timer
    let now = Instant::now();

    let args = CommandLineArguments::parse();

    let run = Run::open(&args.run)
        .with_context(|| format!("failed to open run {}", args.run.display()))?;
    let path = summary::write(&run).context("failed to write summary")?;

    log::info!(
        "Summary written to {} in {:.2} seconds",
        path.display(),
        now.elapsed().as_secs_f64()
    );
    Ok(())
}
