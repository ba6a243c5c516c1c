//! Text chart rendering

use std::path::Path;

use anyhow::Result;
use salescope_core::{chart_panels, format_amount, ChartPanels, Config};

use super::{analyze_file, truncate};

/// Longest bar, in characters
const BAR_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 12;

pub fn cmd_charts(file: &Path, config: &Config) -> Result<()> {
    let session = analyze_file(file, config)?;
    println!("{}", render_panels(&chart_panels(&session), &config.report.currency));
    Ok(())
}

/// Both panels as text, with placeholders for missing ones
pub fn render_panels(panels: &ChartPanels, currency: &str) -> String {
    let mut lines = vec!["📈 Monthly sales".to_string()];
    match &panels.sales {
        Some(sales) if !sales.monthly.is_empty() => {
            let mut rows: Vec<(String, f64)> = sales
                .monthly
                .points()
                .iter()
                .map(|p| (p.month.to_string(), p.value))
                .collect();
            if let Some(forecast) = sales.forecast {
                rows.push(("Forecast".to_string(), forecast));
            }
            lines.extend(bar_chart(&rows, currency));
        }
        _ => lines.push("   no sales data".to_string()),
    }

    lines.push(String::new());
    match &panels.prices {
        Some(prices) if !prices.points.is_empty() => {
            lines.push(format!("🏷️  Price of {}", prices.product));
            let rows: Vec<(String, f64)> = prices
                .points
                .iter()
                .map(|(date, price)| (date.format("%Y-%m-%d").to_string(), *price))
                .collect();
            lines.extend(bar_chart(&rows, currency));
        }
        _ => {
            lines.push("🏷️  Prices".to_string());
            lines.push("   no price data".to_string());
        }
    }

    lines.join("\n")
}

/// Horizontal bars scaled to the largest magnitude
pub fn bar_chart(rows: &[(String, f64)], currency: &str) -> Vec<String> {
    let max = rows.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);

    rows.iter()
        .map(|(label, value)| {
            let len = if max > 0.0 {
                ((value.abs() / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            format!(
                "   {:<width$} {:<bar$} {}",
                truncate(label, LABEL_WIDTH),
                "█".repeat(len),
                format_amount(*value, currency),
                width = LABEL_WIDTH,
                bar = BAR_WIDTH,
            )
        })
        .collect()
}
