//! Analysis session and the workbench that gates user actions
//!
//! An [`AnalysisSession`] is the immutable result of one analysis run. The
//! [`Workbench`] holds the chosen file and the latest completed session and
//! decides which of the four actions is currently available.

use std::fmt;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use serde::Serialize;
use tracing::{info, warn};

use crate::basket;
use crate::charts::{chart_panels, ChartPanels};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::forecast::{forecast, Forecast, ForecastSubject, MonthlyAggregate};
use crate::loader::{load_table, SourceFormat};
use crate::models::{AnalysisMode, BasketRule};
use crate::report::export_report;
use crate::schema::{attach_calendar, classify, Schema};
use crate::table::Table;

/// Number of basket pairs shown in summaries
pub const TOP_PAIRS: usize = 3;

/// Result of analyzing one file
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    source: PathBuf,
    format: SourceFormat,
    encoding: Option<&'static Encoding>,
    table: Table,
    schema: Schema,
    forecast: Forecast,
    /// `None` when the table has no order/product columns
    basket: Option<Vec<BasketRule>>,
}

impl AnalysisSession {
    /// Load, classify and analyze a file
    pub fn analyze(path: &Path, config: &Config) -> Result<Self> {
        let loaded = load_table(path, &config.loader)?;
        let mut table = loaded.table;

        let schema = classify(&table)?;
        attach_calendar(&mut table, &schema)?;

        let forecast = forecast(&table, &schema, &config.forecast)?;
        let basket = match &schema {
            Schema::Sales(sales) => basket::mine(&table, sales, &config.basket),
            Schema::Prices(_) => None,
        };

        info!(
            "Analyzed {} ({} rows, {} analysis): forecast {}",
            path.display(),
            table.row_count(),
            schema.mode(),
            forecast.value
        );

        Ok(Self {
            source: path.to_path_buf(),
            format: loaded.format,
            encoding: loaded.encoding,
            table,
            schema,
            forecast,
            basket,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn encoding(&self) -> Option<&'static Encoding> {
        self.encoding
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn mode(&self) -> AnalysisMode {
        self.schema.mode()
    }

    pub fn forecast(&self) -> &Forecast {
        &self.forecast
    }

    /// Frequent pairs, empty when basket analysis did not run
    pub fn basket_rules(&self) -> &[BasketRule] {
        self.basket.as_deref().unwrap_or(&[])
    }

    /// Whether the table had the columns for basket analysis
    pub fn basket_available(&self) -> bool {
        self.basket.is_some()
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            source: self.source.display().to_string(),
            format: self.format.as_str(),
            encoding: self.encoding.map(|e| e.name()),
            rows: self.table.row_count(),
            mode: self.mode(),
            forecast: self.forecast.value,
            subject: self.forecast.subject.clone(),
            months_used: self.forecast.months_used,
            monthly: self.forecast.monthly.clone(),
            basket_available: self.basket_available(),
            top_pairs: self
                .basket_rules()
                .iter()
                .take(TOP_PAIRS)
                .cloned()
                .collect(),
        }
    }
}

/// Serializable overview of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub source: String,
    pub format: &'static str,
    pub encoding: Option<&'static str>,
    pub rows: usize,
    pub mode: AnalysisMode,
    pub forecast: f64,
    pub subject: ForecastSubject,
    pub months_used: usize,
    pub monthly: MonthlyAggregate,
    pub basket_available: bool,
    pub top_pairs: Vec<BasketRule>,
}

/// User actions offered by the workbench
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ChooseFile,
    Analyze,
    ShowCharts,
    SaveReport,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::ChooseFile,
        Action::Analyze,
        Action::ShowCharts,
        Action::SaveReport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ChooseFile => "open",
            Action::Analyze => "analyze",
            Action::ShowCharts => "charts",
            Action::SaveReport => "save",
        }
    }

    fn requirement(&self) -> &'static str {
        match self {
            Action::ChooseFile => "",
            Action::Analyze => "choose a file first",
            Action::ShowCharts | Action::SaveReport => "analyze a file first",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Selected file plus the latest completed analysis
#[derive(Debug, Default)]
pub struct Workbench {
    config: Config,
    selected: Option<PathBuf>,
    session: Option<AnalysisSession>,
}

impl Workbench {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            selected: None,
            session: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn selected(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    pub fn session(&self) -> Option<&AnalysisSession> {
        self.session.as_ref()
    }

    pub fn is_enabled(&self, action: Action) -> bool {
        match action {
            Action::ChooseFile => true,
            Action::Analyze => self.selected.is_some(),
            Action::ShowCharts | Action::SaveReport => self.session.is_some(),
        }
    }

    /// Select a file; any previous analysis is discarded
    pub fn choose_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        info!("Selected {}", path.display());
        self.selected = Some(path);
        self.session = None;
    }

    /// Analyze the selected file
    ///
    /// The new session replaces the previous one only on success.
    pub fn analyze(&mut self) -> Result<&AnalysisSession> {
        let path = self
            .selected
            .as_deref()
            .ok_or_else(|| unavailable(Action::Analyze))?;

        match AnalysisSession::analyze(path, &self.config) {
            Ok(session) => Ok(&*self.session.insert(session)),
            Err(e) => {
                warn!("Analysis of {} failed: {}", path.display(), e);
                Err(e)
            }
        }
    }

    pub fn chart_panels(&self) -> Result<ChartPanels> {
        let session = self.completed(Action::ShowCharts)?;
        Ok(chart_panels(session))
    }

    /// Write the report for the current session, returning its path
    pub fn save_report(&self) -> Result<PathBuf> {
        let session = self.completed(Action::SaveReport)?;
        export_report(session, &self.config.report)
    }

    fn completed(&self, action: Action) -> Result<&AnalysisSession> {
        self.session.as_ref().ok_or_else(|| unavailable(action))
    }
}

fn unavailable(action: Action) -> Error {
    Error::ActionUnavailable(format!("{}: {}", action, action.requirement()))
}
