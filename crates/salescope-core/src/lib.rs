//! Salescope Core Library
//!
//! Sales and price analysis for tabular datasets:
//! - Loading CSV, delimited text and XLSX files with encoding detection
//! - Schema classification (sales vs. price tables) and calendar columns
//! - Trailing-average next-month forecast
//! - Market basket mining of product pairs
//! - XLSX report export and chart data
//! - Analysis sessions and the action-gating workbench

pub mod basket;
pub mod charts;
pub mod config;
pub mod encoding;
pub mod error;
pub mod forecast;
pub mod loader;
pub mod models;
pub mod report;
pub mod schema;
pub mod session;
pub mod table;

pub use basket::{frequent_pairs, mine, IncidenceTable};
pub use charts::{chart_panels, ChartPanels, PricePanel, SalesPanel};
pub use config::{BasketConfig, Config, ForecastConfig, LoaderConfig, ReportConfig};
pub use encoding::{detect_encoding, detect_encoding_from_bytes};
pub use error::{Error, ErrorKind, Result};
pub use forecast::{forecast, Forecast, ForecastSubject, MonthlyAggregate, MonthlyPoint};
pub use loader::{detect_delimiter, load_table, parse_delimited, LoadedTable, SourceFormat};
pub use models::{AnalysisMode, BasketRule, Key, ProductPair, Value, YearMonth};
pub use report::{export_report, format_amount, report_path, write_report};
pub use schema::{attach_calendar, classify, parse_date, PriceSchema, SalesSchema, Schema};
pub use session::{Action, AnalysisSession, AnalysisSummary, Workbench};
pub use table::Table;
