//! Chart data for a completed analysis
//!
//! Two independent panels, each present only when the table has the
//! columns it needs. Rendering is left to the caller.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::forecast::MonthlyAggregate;
use crate::models::{AnalysisMode, Value, YearMonth};
use crate::schema::{date_of, DATE, MONTH, PRICE, PRODUCT, TOTAL};
use crate::session::AnalysisSession;

/// Monthly sales over the whole table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPanel {
    pub monthly: MonthlyAggregate,
    /// Reference line; set for sales analyses
    pub forecast: Option<f64>,
}

/// Price history of one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePanel {
    pub product: String,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartPanels {
    pub sales: Option<SalesPanel>,
    pub prices: Option<PricePanel>,
}

pub fn chart_panels(session: &AnalysisSession) -> ChartPanels {
    ChartPanels {
        sales: sales_panel(session),
        prices: price_panel(session),
    }
}

/// Total summed per month across all years
fn sales_panel(session: &AnalysisSession) -> Option<SalesPanel> {
    let table = session.table();
    let total = table.column_index(TOTAL)?;
    let month = table.column_index(MONTH)?;

    let mut sums: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for row in table.rows() {
        let Value::Month(ym) = &row[month] else {
            continue;
        };
        *sums.entry(*ym).or_insert(0.0) += row[total].as_f64().unwrap_or(0.0);
    }

    let forecast = (session.mode() == AnalysisMode::Sales).then(|| session.forecast().value);
    Some(SalesPanel {
        monthly: sums.into(),
        forecast,
    })
}

/// Date-sorted prices of the product in the first row
fn price_panel(session: &AnalysisSession) -> Option<PricePanel> {
    let table = session.table();
    let date = table.column_index(DATE)?;
    let price = table.column_index(PRICE)?;
    let product = table.column_index(PRODUCT)?;

    let first = table.rows().first()?[product].key()?;

    let mut points: Vec<(NaiveDate, f64)> = table
        .rows()
        .iter()
        .filter(|row| row[product].key().as_ref() == Some(&first))
        .filter_map(|row| Some((date_of(&row[date]).ok().flatten()?, row[price].as_f64()?)))
        .collect();
    points.sort_by_key(|(d, _)| *d);

    Some(PricePanel {
        product: first.to_string(),
        points,
    })
}
