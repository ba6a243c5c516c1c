//! Dataset loading for delimited text and spreadsheet files
//!
//! Supported inputs:
//! - `.csv` - comma-delimited, strictly decoded with the detected encoding
//! - `.txt` - delimiter sniffed from a sample (comma, then tab, then semicolon),
//!   undecodable bytes replaced with U+FFFD
//! - `.xlsx` - first worksheet, first row as header

use std::fs;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use csv::ReaderBuilder;
use encoding_rs::Encoding;
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::encoding::detect_encoding;
use crate::error::{Error, Result};
use crate::models::Value;
use crate::schema::parse_date;
use crate::table::Table;

/// Input file formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Text,
    Xlsx,
}

impl SourceFormat {
    /// Match the file extension case-insensitively
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Text),
            "xlsx" => Ok(Self::Xlsx),
            "" => Err(Error::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(Error::UnsupportedFormat(format!(".{}", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Text => "txt",
            Self::Xlsx => "xlsx",
        }
    }
}

/// A table plus the facts learned while loading it
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub format: SourceFormat,
    /// Encoding used to decode text input (`None` for spreadsheets)
    pub encoding: Option<&'static Encoding>,
    /// Field delimiter of text input (`None` for spreadsheets)
    pub delimiter: Option<u8>,
}

/// Load a dataset, dispatching on the file extension
pub fn load_table(path: &Path, config: &LoaderConfig) -> Result<LoadedTable> {
    let format = SourceFormat::from_path(path)?;

    let loaded = match format {
        SourceFormat::Csv => {
            let encoding = detect_encoding(path, config)?;
            let text = decode(&fs::read(path)?, encoding, true)?;
            LoadedTable {
                table: parse_delimited(&text, b',')?,
                format,
                encoding: Some(encoding),
                delimiter: Some(b','),
            }
        }
        SourceFormat::Text => {
            let encoding = detect_encoding(path, config)?;
            let text = decode(&fs::read(path)?, encoding, false)?;
            let sample: String = text.chars().take(config.delimiter_sample_chars).collect();
            let delimiter = detect_delimiter(&sample);
            LoadedTable {
                table: parse_delimited(&text, delimiter)?,
                format,
                encoding: Some(encoding),
                delimiter: Some(delimiter),
            }
        }
        SourceFormat::Xlsx => LoadedTable {
            table: read_xlsx(path)?,
            format,
            encoding: None,
            delimiter: None,
        },
    };

    debug!(
        "Loaded {} rows x {} columns from {} ({})",
        loaded.table.row_count(),
        loaded.table.columns().len(),
        path.display(),
        format.as_str()
    );
    Ok(loaded)
}

/// Decode file bytes, stripping any BOM
///
/// In strict mode undecodable bytes are an error; otherwise they become
/// U+FFFD.
fn decode(bytes: &[u8], encoding: &'static Encoding, strict: bool) -> Result<String> {
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        if strict {
            return Err(Error::Decode(format!(
                "Input is not valid {}",
                actual.name()
            )));
        }
        warn!(
            "Replaced undecodable bytes while reading input as {}",
            actual.name()
        );
    }
    Ok(text.into_owned())
}

/// Choose a field delimiter from a text sample
///
/// Comma wins whenever present, then tab; semicolon is the fallback.
pub fn detect_delimiter(sample: &str) -> u8 {
    if sample.contains(',') {
        b','
    } else if sample.contains('\t') {
        b'\t'
    } else {
        b';'
    }
}

/// Parse delimited text with a header row into a table
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(Error::EmptyData("No columns to parse from file".into()));
    }

    let mut table = Table::new(headers.iter().map(|h| h.to_string()).collect());
    for result in rdr.records() {
        let record = result?;
        table.push_row(record.iter().map(Value::from_field).collect())?;
    }

    Ok(table)
}

/// Read the first worksheet of an .xlsx workbook
fn read_xlsx(path: &Path) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::EmptyData("Workbook has no worksheets".into()))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| Error::EmptyData("Worksheet is empty".into()))?;

    let columns = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("Unnamed: {}", i),
            other => other.to_string(),
        })
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        let values: Vec<Value> = row.iter().map(cell_value).collect();
        // Rows inside the used range can be entirely blank
        if values.iter().all(Value::is_empty) {
            continue;
        }
        table.push_row(values)?;
    }

    Ok(table)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Empty,
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Value::Int(*f as i64),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) if s.trim().is_empty() => Value::Empty,
        Data::String(s) => Value::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => Value::Date(datetime.date()),
            None => Value::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_date(s)
            .map(Value::Date)
            .unwrap_or_else(|_| Value::Text(s.clone())),
        Data::DurationIso(s) => Value::Text(s.clone()),
    }
}
