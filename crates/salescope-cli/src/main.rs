//! Salescope CLI - Sales forecasts and product basket analysis
//!
//! Usage:
//!   salescope analyze --file sales.csv     Print forecast and top product pairs
//!   salescope report --file sales.csv      Write sales_sales_report.xlsx
//!   salescope charts --file prices.txt     Print sales and price charts
//!   salescope shell                        Interactive session

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use salescope_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Analyze { file, json } => commands::cmd_analyze(&file, &config, json),
        Commands::Report { file } => commands::cmd_report(&file, &config),
        Commands::Charts { file } => commands::cmd_charts(&file, &config),
        Commands::Shell => commands::cmd_shell(config),
    }
}
