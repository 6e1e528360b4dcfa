//! Entry point for the plane viewer.

use anyhow::Result;
use clap::Parser;
use plane_viewer::{app::App, config::Config};

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = Config::parse();
    let print_report = config.report;

    // Initialise the application (async → sync).
    let mut app = pollster::block_on(App::new(config))?;
    let reports = app.run()?;

    let rejected = reports.iter().filter(|r| r.error.is_some()).count();
    if rejected > 0 {
        log::warn!("{} of {} frames were rejected", rejected, reports.len());
    }

    if print_report {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}
