//! Trailing-average forecast over monthly aggregates
//!
//! - Sales: Total summed per month, restricted to the latest year present
//! - Prices: Price averaged per month for the first product in file order
//!
//! The forecast is the mean of the last `window` monthly points (or of all
//! points when there are no more than `window`), rounded half-to-even.
//! An empty aggregate forecasts 0.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::config::ForecastConfig;
use crate::error::{Error, Result};
use crate::models::{AnalysisMode, Value, YearMonth};
use crate::schema::{date_of, row_error, PriceSchema, SalesSchema, Schema};
use crate::table::Table;

/// One month of the aggregate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: YearMonth,
    pub value: f64,
}

/// Monthly values in chronological order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonthlyAggregate {
    points: Vec<MonthlyPoint>,
}

impl MonthlyAggregate {
    pub fn points(&self) -> &[MonthlyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

impl From<BTreeMap<YearMonth, f64>> for MonthlyAggregate {
    fn from(map: BTreeMap<YearMonth, f64>) -> Self {
        Self {
            points: map
                .into_iter()
                .map(|(month, value)| MonthlyPoint { month, value })
                .collect(),
        }
    }
}

/// What a forecast is about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastSubject {
    /// Monthly sales of the latest year in the data
    Sales { year: Option<i32> },
    /// Monthly average price of one product
    Price { product: Option<String> },
}

/// Next-month forecast with the aggregate it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub mode: AnalysisMode,
    /// Rounded to a whole number
    pub value: f64,
    pub subject: ForecastSubject,
    pub monthly: MonthlyAggregate,
    /// Number of trailing months averaged
    pub months_used: usize,
}

/// Forecast for a classified table
pub fn forecast(table: &Table, schema: &Schema, config: &ForecastConfig) -> Result<Forecast> {
    let (subject, monthly) = match schema {
        Schema::Sales(sales) => {
            let (year, monthly) = monthly_sales(table, sales)?;
            (ForecastSubject::Sales { year }, monthly)
        }
        Schema::Prices(prices) => {
            let (product, monthly) = monthly_prices(table, prices)?;
            (ForecastSubject::Price { product }, monthly)
        }
    };

    let value = trailing_average(&monthly, config.window);
    let months_used = monthly.len().min(config.window);

    debug!(
        "Forecast {} from {} of {} monthly points: {}",
        schema.mode(),
        months_used,
        monthly.len(),
        value
    );

    Ok(Forecast {
        mode: schema.mode(),
        value,
        subject,
        monthly,
        months_used,
    })
}

/// Rounded mean of the last `window` points (all points when fewer)
pub fn trailing_average(monthly: &MonthlyAggregate, window: usize) -> f64 {
    let values = monthly.values();
    if values.is_empty() {
        return 0.0;
    }

    let tail = &values[values.len().saturating_sub(window)..];
    let mean = tail.iter().sum::<f64>() / tail.len() as f64;
    mean.round_ties_even()
}

/// Total per month for the latest year, with that year
pub fn monthly_sales(
    table: &Table,
    schema: &SalesSchema,
) -> Result<(Option<i32>, MonthlyAggregate)> {
    let dates = row_dates(table, schema.date)?;
    let Some(last_year) = dates.iter().flatten().map(|d| d.year()).max() else {
        return Ok((None, MonthlyAggregate::default()));
    };

    let mut totals: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for (i, (row, date)) in table.rows().iter().zip(&dates).enumerate() {
        let Some(date) = date.filter(|d| d.year() == last_year) else {
            continue;
        };
        let amount = numeric(&row[schema.total], i, "Total")?.unwrap_or(0.0);
        *totals.entry(YearMonth::of(date)).or_insert(0.0) += amount;
    }

    Ok((Some(last_year), totals.into()))
}

/// Average price per month for the first product in file order, with that
/// product
///
/// Months where the product has no price at all are left out.
pub fn monthly_prices(
    table: &Table,
    schema: &PriceSchema,
) -> Result<(Option<String>, MonthlyAggregate)> {
    let Some(first) = table.rows().first().and_then(|r| r[schema.product].key()) else {
        return Ok((None, MonthlyAggregate::default()));
    };

    let dates = row_dates(table, schema.date)?;
    let mut selected: Vec<(usize, NaiveDate)> = dates
        .into_iter()
        .enumerate()
        .filter_map(|(i, date)| Some((i, date?)))
        .filter(|(i, _)| table.rows()[*i][schema.product].key().as_ref() == Some(&first))
        .collect();
    selected.sort_by_key(|(_, date)| *date);

    let mut sums: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();
    for (i, date) in selected {
        if let Some(price) = numeric(&table.rows()[i][schema.price], i, "Price")? {
            let entry = sums.entry(YearMonth::of(date)).or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
        }
    }

    let means: BTreeMap<YearMonth, f64> = sums
        .into_iter()
        .map(|(month, (sum, count))| (month, sum / count as f64))
        .collect();

    Ok((Some(first.to_string()), means.into()))
}

/// Row dates; `None` where the date cell is empty
fn row_dates(table: &Table, idx: usize) -> Result<Vec<Option<NaiveDate>>> {
    table
        .column_values(idx)
        .enumerate()
        .map(|(i, value)| date_of(value).map_err(|e| row_error(i, e)))
        .collect()
}

/// Numeric cell value; `None` for empty cells, an error for text
fn numeric(value: &Value, row: usize, column: &str) -> Result<Option<f64>> {
    match value {
        Value::Empty => Ok(None),
        other => other.as_f64().map(Some).ok_or_else(|| {
            Error::InvalidData(format!(
                "Row {}: {} is not a number: {}",
                row + 1,
                column,
                other
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_delimited;
    use crate::schema::{attach_calendar, classify};

    fn prepared(csv: &str) -> (Table, Schema) {
        let mut table = parse_delimited(csv, b',').unwrap();
        let schema = classify(&table).unwrap();
        attach_calendar(&mut table, &schema).unwrap();
        (table, schema)
    }

    fn aggregate(values: &[f64]) -> MonthlyAggregate {
        let map: BTreeMap<YearMonth, f64> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (YearMonth::new(2024, i as u32 + 1), *v))
            .collect();
        map.into()
    }

    #[test]
    fn test_trailing_average_empty() {
        assert_eq!(trailing_average(&aggregate(&[]), 3), 0.0);
    }

    #[test]
    fn test_trailing_average_short_history_uses_all_points() {
        assert_eq!(trailing_average(&aggregate(&[30.0]), 3), 30.0);
        assert_eq!(trailing_average(&aggregate(&[30.0, 40.0]), 3), 35.0);
        assert_eq!(trailing_average(&aggregate(&[10.0, 20.0, 60.0]), 3), 30.0);
    }

    #[test]
    fn test_trailing_average_uses_last_three() {
        // mean(40, 50, 60) = 50; the leading 1000 is ignored
        assert_eq!(
            trailing_average(&aggregate(&[1000.0, 40.0, 50.0, 60.0]), 3),
            50.0
        );
    }

    #[test]
    fn test_rounding_is_half_to_even() {
        // mean(1, 2) = 1.5 -> 2, mean(2, 3) = 2.5 -> 2
        assert_eq!(trailing_average(&aggregate(&[1.0, 2.0]), 3), 2.0);
        assert_eq!(trailing_average(&aggregate(&[2.0, 3.0]), 3), 2.0);
        assert_eq!(trailing_average(&aggregate(&[10.0, 10.0, 11.0]), 3), 10.0);
    }

    #[test]
    fn test_sales_scenario() {
        let (table, schema) = prepared(
            "Date,OrderID,Product,Total
2024-01-05,1,A,10
2024-01-05,1,B,20
2024-02-10,2,A,15
2024-02-10,2,B,25",
        );

        let result = forecast(&table, &schema, &ForecastConfig::default()).unwrap();
        assert_eq!(result.mode, AnalysisMode::Sales);
        assert_eq!(result.subject, ForecastSubject::Sales { year: Some(2024) });
        assert_eq!(result.monthly.values(), vec![30.0, 40.0]);
        assert_eq!(result.value, 35.0);
        assert_eq!(result.months_used, 2);
    }

    #[test]
    fn test_sales_only_latest_year() {
        let (table, schema) = prepared(
            "Date,Total
2023-11-01,1000
2023-12-01,1000
2024-01-15,100
2024-01-20,50
2024-02-01,200
2024-03-01,300
2024-04-01,400",
        );
        let Schema::Sales(sales) = schema else {
            panic!("expected sales schema");
        };

        let (year, monthly) = monthly_sales(&table, &sales).unwrap();
        assert_eq!(year, Some(2024));
        assert_eq!(monthly.values(), vec![150.0, 200.0, 300.0, 400.0]);
        assert_eq!(monthly.points()[0].month, YearMonth::new(2024, 1));
        // mean(200, 300, 400)
        assert_eq!(trailing_average(&monthly, 3), 300.0);
    }

    #[test]
    fn test_sales_sorted_by_month_regardless_of_row_order() {
        let (table, schema) = prepared(
            "Date,Total
2024-03-01,3
2024-01-01,1
2024-02-01,2",
        );
        let Schema::Sales(sales) = schema else {
            panic!("expected sales schema");
        };
        let (_, monthly) = monthly_sales(&table, &sales).unwrap();
        assert_eq!(monthly.values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sales_empty_total_counts_as_zero() {
        let (table, schema) = prepared("Date,Total\n2024-01-01,\n2024-02-01,10\n");
        let result = forecast(&table, &schema, &ForecastConfig::default()).unwrap();
        assert_eq!(result.monthly.values(), vec![0.0, 10.0]);
        assert_eq!(result.value, 5.0);
    }

    #[test]
    fn test_sales_non_numeric_total_fails() {
        let (table, schema) = prepared("Date,Total\n2024-01-01,ten\n");
        let err = forecast(&table, &schema, &ForecastConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Total is not a number: ten"));
    }

    #[test]
    fn test_sales_rows_without_date_are_skipped() {
        let (table, schema) = prepared("Date,Total\n2024-01-05,10\n2024-02-05,20\n,\n");
        let result = forecast(&table, &schema, &ForecastConfig::default()).unwrap();
        assert_eq!(result.monthly.values(), vec![10.0, 20.0]);
        assert_eq!(result.value, 15.0);
    }

    #[test]
    fn test_sales_unparseable_date_names_row() {
        // Calendar columns not attached, so the raw text reaches the aggregate
        let table = parse_delimited("Date,Total\n2024-01-05,10\nsoon,20\n", b',').unwrap();
        let Schema::Sales(sales) = classify(&table).unwrap() else {
            panic!("expected sales schema");
        };
        let err = monthly_sales(&table, &sales).unwrap_err();
        assert_eq!(err.to_string(), "Invalid data: Row 2: Unable to parse date: soon");
    }

    #[test]
    fn test_sales_no_rows() {
        let (table, schema) = prepared("Date,Total\n");
        let result = forecast(&table, &schema, &ForecastConfig::default()).unwrap();
        assert_eq!(result.value, 0.0);
        assert_eq!(result.subject, ForecastSubject::Sales { year: None });
        assert!(result.monthly.is_empty());
    }

    #[test]
    fn test_prices_first_product_only() {
        let (table, schema) = prepared(
            "Date,Product,Price
2024-02-10,Milk,90
2024-01-05,Milk,80
2024-01-20,Milk,84
2024-01-07,Bread,1000
2024-03-01,Milk,100
2024-04-01,Milk,110",
        );

        let result = forecast(&table, &schema, &ForecastConfig::default()).unwrap();
        assert_eq!(result.mode, AnalysisMode::Prices);
        assert_eq!(
            result.subject,
            ForecastSubject::Price {
                product: Some("Milk".into())
            }
        );
        assert_eq!(result.monthly.values(), vec![82.0, 90.0, 100.0, 110.0]);
        assert_eq!(result.value, 100.0);
    }

    #[test]
    fn test_prices_month_without_price_is_skipped() {
        let (table, schema) = prepared(
            "Date,Product,Price
2024-01-05,Milk,80
2024-02-05,Milk,
2024-03-05,Milk,90",
        );
        let result = forecast(&table, &schema, &ForecastConfig::default()).unwrap();
        assert_eq!(result.monthly.len(), 2);
        assert_eq!(result.value, 85.0);
    }

    #[test]
    fn test_custom_window() {
        let (table, schema) = prepared(
            "Date,Total
2024-01-01,10
2024-02-01,20
2024-03-01,30
2024-04-01,40",
        );
        let result = forecast(&table, &schema, &ForecastConfig { window: 1 }).unwrap();
        assert_eq!(result.value, 40.0);
        assert_eq!(result.months_used, 1);
    }
}
