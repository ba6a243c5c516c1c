//! CLI command implementations
//!
//! Commands are organized by what they produce:
//! - `analyze` - Summary of a single analysis (text or JSON)
//! - `charts` - Text bar charts of monthly sales and product prices
//! - `report` - XLSX report export
//! - `shell` - Interactive session over the workbench

pub mod analyze;
pub mod charts;
pub mod report;
pub mod shell;

// Re-export command functions for main.rs
pub use analyze::*;
pub use charts::*;
pub use report::*;
pub use shell::*;

use std::path::Path;

use anyhow::Result;
use salescope_core::{AnalysisSession, Config, Error};
use tracing::debug;

/// Single-line error message titled by its kind
pub fn describe_error(err: &Error) -> String {
    format!("{}: {}", err.kind().title(), err)
}

/// Run a full analysis, turning failures into titled messages
pub fn analyze_file(file: &Path, config: &Config) -> Result<AnalysisSession> {
    debug!("Analyzing {}", file.display());
    AnalysisSession::analyze(file, config).map_err(|e| anyhow::anyhow!(describe_error(&e)))
}

/// Truncate a string with ellipsis (char-safe)
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
