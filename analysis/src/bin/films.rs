use anyhow::Context;
use clap::Parser;
use gs2_analysis::film::{render_run, PlottersAnimator};
use gs2_analysis::run::Run;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Instant;

/// Renders a film of every fluctuating moment of a GS2 run
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

    let mut animator = PlottersAnimator::new();
    render_run(&run, &mut animator).context("failed to render films")?;

    log::info!(
        "Films finished in {:.2} seconds",
        now.elapsed().as_secs_f64()
    );
    Ok(())
}
