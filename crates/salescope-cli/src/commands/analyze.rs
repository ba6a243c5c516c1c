//! Analysis summary command

use std::path::Path;

use anyhow::{Context, Result};
use salescope_core::report::forecast_label;
use salescope_core::{format_amount, AnalysisSummary, Config, ForecastSubject};

use super::analyze_file;

pub fn cmd_analyze(file: &Path, config: &Config, json: bool) -> Result<()> {
    let session = analyze_file(file, config)?;
    let summary = session.summary();

    if json {
        let output =
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", output);
    } else {
        println!("{}", render_summary(&summary, &config.report.currency));
    }

    Ok(())
}

/// Post-analysis message: forecast plus up to three product pairs
///
/// Price forecasts name their product.
pub fn render_summary(summary: &AnalysisSummary, currency: &str) -> String {
    let label = match &summary.subject {
        ForecastSubject::Price {
            product: Some(product),
        } => format!("{} ({})", forecast_label(summary.mode), product),
        _ => forecast_label(summary.mode),
    };
    let mut lines = vec![
        format!(
            "✅ Analyzed {} ({} rows, {} analysis)",
            summary.source, summary.rows, summary.mode
        ),
        format!("   {}: {}", label, format_amount(summary.forecast, currency)),
    ];

    if summary.months_used > 0 {
        lines.push(format!(
            "   Based on the last {} of {} months",
            summary.months_used,
            summary.monthly.len()
        ));
    }

    if summary.basket_available {
        if summary.top_pairs.is_empty() {
            lines.push("   No product pairs bought together often enough".to_string());
        } else {
            lines.push(String::new());
            lines.push("🛒 Frequently bought together".to_string());
            for (i, rule) in summary.top_pairs.iter().enumerate() {
                lines.push(format!("   {}. {} ({} orders)", i + 1, rule.pair, rule.count));
            }
        }
    } else {
        lines.push(format!(
            "   Basket analysis unavailable ({} mode)",
            summary.mode
        ));
    }

    lines.join("\n")
}
