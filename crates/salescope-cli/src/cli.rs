//! CLI argument definitions using clap
//!
//! This module contains the clap structs for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Salescope - Sales forecasts and product basket analysis
#[derive(Parser)]
#[command(name = "salescope")]
#[command(about = "Sales and price analyzer for CSV, TXT and XLSX datasets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Analyzer config file (defaults to the user config, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a dataset and print the forecast and top product pairs
    Analyze {
        /// Dataset to analyze (.csv, .txt or .xlsx)
        #[arg(short, long)]
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a dataset and write the XLSX report next to it
    Report {
        /// Dataset to analyze (.csv, .txt or .xlsx)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Analyze a dataset and print sales and price charts
    Charts {
        /// Dataset to analyze (.csv, .txt or .xlsx)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Interactive session: open, analyze, charts, save
    Shell,
}
