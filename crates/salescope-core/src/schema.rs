//! Schema classification and calendar columns
//!
//! A table is either a sales table (`Date`, `Total`) or a price table
//! (`Date`, `Price`, `Product`). Sales is checked first, so a table holding
//! both column sets is analyzed as sales.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{AnalysisMode, Value, YearMonth};
use crate::table::Table;

pub const DATE: &str = "Date";
pub const TOTAL: &str = "Total";
pub const PRICE: &str = "Price";
pub const PRODUCT: &str = "Product";
pub const ORDER_ID: &str = "OrderID";
pub const YEAR: &str = "Year";
pub const MONTH: &str = "Month";

/// Resolved columns of a sales table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesSchema {
    pub date: usize,
    pub total: usize,
    pub order_id: Option<usize>,
    pub product: Option<usize>,
}

impl SalesSchema {
    /// Order and product columns, when both exist
    pub fn basket_columns(&self) -> Option<(usize, usize)> {
        self.order_id.zip(self.product)
    }
}

/// Resolved columns of a price table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSchema {
    pub date: usize,
    pub price: usize,
    pub product: usize,
}

/// The two ways a table can be analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Sales(SalesSchema),
    Prices(PriceSchema),
}

impl Schema {
    pub fn mode(&self) -> AnalysisMode {
        match self {
            Schema::Sales(_) => AnalysisMode::Sales,
            Schema::Prices(_) => AnalysisMode::Prices,
        }
    }

    pub fn date_column(&self) -> usize {
        match self {
            Schema::Sales(s) => s.date,
            Schema::Prices(p) => p.date,
        }
    }
}

/// Classify a table by column presence
pub fn classify(table: &Table) -> Result<Schema> {
    let col = |name: &str| table.column_index(name);

    if let (Some(date), Some(total)) = (col(DATE), col(TOTAL)) {
        return Ok(Schema::Sales(SalesSchema {
            date,
            total,
            order_id: col(ORDER_ID),
            product: col(PRODUCT),
        }));
    }

    if let (Some(date), Some(price), Some(product)) = (col(DATE), col(PRICE), col(PRODUCT)) {
        return Ok(Schema::Prices(PriceSchema {
            date,
            price,
            product,
        }));
    }

    Err(Error::Structure {
        columns: table.columns().to_vec(),
    })
}

/// Parse the date column into calendar dates and set `Year` and `Month`
///
/// Existing `Year`/`Month` columns are overwritten. Column indices resolved
/// by `classify` stay valid: new columns are only ever appended. Rows with
/// an empty date keep empty `Date`, `Year` and `Month` cells; a date that
/// cannot be parsed is an error.
pub fn attach_calendar(table: &mut Table, schema: &Schema) -> Result<Vec<Option<NaiveDate>>> {
    let date_idx = schema.date_column();

    let dates = table
        .column_values(date_idx)
        .enumerate()
        .map(|(i, value)| date_of(value).map_err(|e| row_error(i, e)))
        .collect::<Result<Vec<_>>>()?;

    table.set_column(DATE, calendar_column(&dates, Value::Date))?;
    table.set_column(
        YEAR,
        calendar_column(&dates, |d| Value::Int(d.year() as i64)),
    )?;
    table.set_column(
        MONTH,
        calendar_column(&dates, |d| Value::Month(YearMonth::of(d))),
    )?;

    let missing = dates.iter().filter(|d| d.is_none()).count();
    if missing > 0 {
        debug!("{} rows have no date", missing);
    }
    debug!("Attached calendar columns to {} rows", dates.len());
    Ok(dates)
}

fn calendar_column(dates: &[Option<NaiveDate>], f: impl Fn(NaiveDate) -> Value) -> Vec<Value> {
    dates.iter().map(|d| d.map_or(Value::Empty, &f)).collect()
}

/// Prefix a data error with its 1-based row number
pub(crate) fn row_error(row: usize, err: Error) -> Error {
    match err {
        Error::InvalidData(msg) => Error::InvalidData(format!("Row {}: {}", row + 1, msg)),
        other => other,
    }
}

/// Calendar date of a cell; `None` for an empty cell
pub(crate) fn date_of(value: &Value) -> Result<Option<NaiveDate>> {
    match value {
        Value::Empty => Ok(None),
        Value::Date(d) => Ok(Some(*d)),
        Value::Text(s) => parse_date(s).map(Some),
        other => Err(Error::InvalidData(format!(
            "Unable to parse date: {}",
            other
        ))),
    }
}

/// Parse a date string in various common formats
///
/// A time of day after the date is accepted and dropped.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let date_formats = [
        "%Y-%m-%d", // 2024-01-15
        "%Y/%m/%d", // 2024/01/15
        "%d.%m.%Y", // 15.01.2024
        "%m/%d/%y", // 01/15/24 (before %Y, which would read "24" as year 24)
        "%m/%d/%Y", // 01/15/2024
        "%d/%m/%Y", // 15/01/2024 (European)
        "%m-%d-%Y", // 01-15-2024
    ];

    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%d.%m.%Y %H:%M:%S",
        "%d.%m.%Y %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];

    for fmt in datetime_formats {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(datetime.date());
        }
    }

    Err(Error::InvalidData(format!("Unable to parse date: {}", s)))
}
