pub mod calendar;
pub mod cli;
pub mod config;
pub mod report;
pub mod roster;

use anyhow::{Context, Result};
use calendar::{EventSource, IcsFile, Window};
use env_logger::Env;
use log::*;
use std::io::Write;

/// Read both schedules and write the weekly comparison to `out`.
///
/// Both files are fully read before anything is written, so a bad calendar
/// never leaves a partial report behind.
pub fn run<W: Write>(args: &cli::CliArgs, out: &mut W) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let window = Window::months_from(args.start, config.window_months)
        .with_context(|| format!("Report window starting {} is out of range", args.start))?;
    info!("Building roster report for {} to {}", window.start, window.end);

    let primary = load_roster(&IcsFile::new(&args.primary), &window, &config)?;
    let secondary = load_roster(&IcsFile::new(&args.secondary), &window, &config)?;

    report::ReportRenderer::new(&config).render(&primary, &secondary, out)
}

/// Events from `source` folded into weekly rosters
pub fn load_roster<S: EventSource>(
    source: &S,
    window: &Window,
    config: &Config,
) -> Result<roster::AggregationResult> {
    let events = source.events(window)?;
    let result = roster::aggregate_with_marker(&events, &config.person_marker);
    debug!("{} events over {} weeks", events.len(), result.weeks().len());
    Ok(result)
}

pub fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

// Re-export commonly used types
pub use calendar::{Event, SourceError};
pub use config::Config;
pub use roster::{aggregate, week_start, AggregationResult, WeekKey};
