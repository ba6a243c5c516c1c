//! Report export command

use std::path::Path;

use anyhow::Result;
use salescope_core::{export_report, Config};

use super::{analyze_file, describe_error};

pub fn cmd_report(file: &Path, config: &Config) -> Result<()> {
    let session = analyze_file(file, config)?;

    println!("📊 Writing report for {}...", file.display());
    let path =
        export_report(&session, &config.report).map_err(|e| anyhow::anyhow!(describe_error(&e)))?;

    println!("✅ Report saved to {}", path.display());
    Ok(())
}
