//! XLSX report export
//!
//! The report has up to three sheets:
//! - `Data` - the analyzed table, dates as `YYYY-MM-DD` text
//! - `Forecast` - one labelled row with the formatted forecast
//! - `Basket` - frequent product pairs (only when any were found)
//!
//! Columns are sized to their widest cell plus padding, capped at
//! `max_column_width`.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, info};

use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::models::{AnalysisMode, BasketRule, Value};
use crate::session::AnalysisSession;

pub const DATA_SHEET: &str = "Data";
pub const FORECAST_SHEET: &str = "Forecast";
pub const BASKET_SHEET: &str = "Basket";

/// Report path for an input file: extension replaced by the report suffix
pub fn report_path(input: &Path, config: &ReportConfig) -> PathBuf {
    let mut stem = input.with_extension("").into_os_string();
    stem.push(&config.suffix);
    PathBuf::from(stem)
}

/// Write the report next to the session's input file
pub fn export_report(session: &AnalysisSession, config: &ReportConfig) -> Result<PathBuf> {
    let path = report_path(session.source(), config);
    write_report(session, &path, config)?;
    info!("Report saved to {}", path.display());
    Ok(path)
}

/// Write the report to `path`
pub fn write_report(session: &AnalysisSession, path: &Path, config: &ReportConfig) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    write_sheet(
        &mut workbook,
        DATA_SHEET,
        session.table().columns(),
        session.table().rows(),
        &header_format,
        config,
    )?;

    let forecast_rows = vec![vec![
        Value::Text(forecast_label(session.mode())),
        Value::Text(format_amount(session.forecast().value, &config.currency)),
    ]];
    write_sheet(
        &mut workbook,
        FORECAST_SHEET,
        &["Forecast".to_string(), "Value".to_string()],
        &forecast_rows,
        &header_format,
        config,
    )?;

    if !session.basket_rules().is_empty() {
        write_sheet(
            &mut workbook,
            BASKET_SHEET,
            &["Products".to_string(), "Frequency".to_string()],
            &basket_rows(session.basket_rules()),
            &header_format,
            config,
        )?;
    }

    workbook.save(path)?;
    debug!(
        "Wrote {} data rows and {} basket rows to {}",
        session.table().row_count(),
        session.basket_rules().len(),
        path.display()
    );
    Ok(())
}

/// Label of the forecast row
pub fn forecast_label(mode: AnalysisMode) -> String {
    format!("Forecast of {} for next month", mode.subject_noun())
}

/// Whole-number amount with thousands separators and a currency suffix
///
/// `format_amount(1234567.0, "руб.") == "1,234,567 руб."`
pub fn format_amount(value: f64, currency: &str) -> String {
    let rounded = value.round_ties_even();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    if currency.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{} {}", sign, grouped, currency)
    }
}

/// Width for a column: widest of header and cells plus padding, capped
pub fn column_width<'a>(
    header: &str,
    cells: impl Iterator<Item = &'a Value>,
    config: &ReportConfig,
) -> usize {
    let widest = cells
        .map(|v| v.to_string().chars().count())
        .max()
        .unwrap_or(0)
        .max(header.chars().count());
    (widest + config.column_padding).min(config.max_column_width)
}

fn basket_rows(rules: &[BasketRule]) -> Vec<Vec<Value>> {
    rules
        .iter()
        .map(|rule| {
            vec![
                Value::Text(rule.pair.to_string()),
                Value::Int(rule.count as i64),
            ]
        })
        .collect()
}

fn write_sheet(
    workbook: &mut Workbook,
    name: &str,
    headers: &[String],
    rows: &[Vec<Value>],
    header_format: &Format,
    config: &ReportConfig,
) -> Result<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;

    for (c, header) in headers.iter().enumerate() {
        let col = column_number(c)?;
        worksheet.write_string_with_format(0, col, header, header_format)?;

        let width = column_width(header, rows.iter().map(|row| &row[c]), config);
        worksheet.set_column_width(col, width as f64)?;
    }

    for (r, row) in rows.iter().enumerate() {
        let row_num = u32::try_from(r + 1)
            .map_err(|_| Error::InvalidData(format!("Too many rows for sheet {}", name)))?;
        for (c, value) in row.iter().enumerate() {
            let col = column_number(c)?;
            match value {
                Value::Empty => {}
                Value::Bool(b) => {
                    worksheet.write_boolean(row_num, col, *b)?;
                }
                Value::Int(i) => {
                    worksheet.write_number(row_num, col, *i as f64)?;
                }
                Value::Float(f) => {
                    worksheet.write_number(row_num, col, *f)?;
                }
                // Dates and months are written as text in their display form
                other => {
                    worksheet.write_string(row_num, col, &other.to_string())?;
                }
            }
        }
    }

    Ok(())
}

fn column_number(c: usize) -> Result<u16> {
    u16::try_from(c).map_err(|_| Error::InvalidData(format!("Too many columns: {}", c + 1)))
}
