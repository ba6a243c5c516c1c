//! Analyzer configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), or the user override in the config dir
//!    (~/.config/salescope/analyzer.toml on Linux) when it exists
//! 2. Embedded defaults (compiled into binary)
//!
//! Every key is optional: a partial file only overrides what it names.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analyzer.toml");

/// Dataset loading settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Bytes read from the start of a file for encoding detection
    pub encoding_sample_bytes: usize,
    /// Decoded characters sampled to pick the `.txt` delimiter
    pub delimiter_sample_chars: usize,
    /// Encoding label used when detection is inconclusive
    pub fallback_encoding: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            encoding_sample_bytes: 10_000,
            delimiter_sample_chars: 1024,
            fallback_encoding: "utf-8".to_string(),
        }
    }
}

/// Forecast settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Trailing months averaged into the forecast
    pub window: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { window: 3 }
    }
}

/// Basket mining settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BasketConfig {
    /// Minimum number of orders a pair must appear in to be reported
    pub min_support: usize,
}

impl Default for BasketConfig {
    fn default() -> Self {
        Self { min_support: 2 }
    }
}

/// Report export settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub suffix: String,
    pub max_column_width: usize,
    pub column_padding: usize,
    pub currency: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            suffix: "_sales_report.xlsx".to_string(),
            max_column_width: 50,
            column_padding: 2,
            currency: "руб.".to_string(),
        }
    }
}

/// Full analyzer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loader: LoaderConfig,
    pub forecast: ForecastConfig,
    pub basket: BasketConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration, preferring `path`, then the user override, then
    /// the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            debug!("Loading config from {}", path.display());
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            return Self::from_toml(&content);
        }

        if let Some(default_path) = default_config_path() {
            if default_path.exists() {
                debug!("Loading config override from {}", default_path.display());
                let content = fs::read_to_string(&default_path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", default_path.display(), e))
                })?;
                return Self::from_toml(&content);
            }
        }

        Self::embedded()
    }

    /// The defaults compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.forecast.window == 0 {
            return Err(Error::Config("forecast.window must be at least 1".into()));
        }
        if self.basket.min_support == 0 {
            return Err(Error::Config("basket.min_support must be at least 1".into()));
        }
        if self.report.max_column_width == 0 {
            return Err(Error::Config(
                "report.max_column_width must be at least 1".into(),
            ));
        }
        if self.report.suffix.is_empty() {
            return Err(Error::Config("report.suffix must not be empty".into()));
        }
        if encoding_rs::Encoding::for_label(self.loader.fallback_encoding.as_bytes()).is_none() {
            return Err(Error::Config(format!(
                "Unknown fallback encoding: {}",
                self.loader.fallback_encoding
            )));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("salescope").join("analyzer.toml"))
}
