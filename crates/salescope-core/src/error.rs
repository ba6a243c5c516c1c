//! Error types for salescope

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error(
        "Unrecognized table structure. Expected either Date, Total (sales analysis) \
         or Date, Price, Product (price analysis). Actual columns: {}",
        columns.join(", ")
    )]
    Structure { columns: Vec<String> },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    #[error("Report write error: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Text decoding error: {0}")]
    Decode(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Action unavailable: {0}")]
    ActionUnavailable(String),
}

/// Broad error category shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    Structure,
    AnalysisFailure,
    ReportWrite,
    Unavailable,
}

impl ErrorKind {
    /// Title used when reporting an error of this kind
    pub fn title(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat => "Unsupported format",
            Self::Structure => "Structure error",
            Self::AnalysisFailure => "Analysis error",
            Self::ReportWrite => "Save error",
            Self::Unavailable => "Not available",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Error::Structure { .. } => ErrorKind::Structure,
            Error::Report(_) => ErrorKind::ReportWrite,
            Error::ActionUnavailable(_) => ErrorKind::Unavailable,
            Error::Csv(_)
            | Error::Spreadsheet(_)
            | Error::Io(_)
            | Error::Config(_)
            | Error::Decode(_)
            | Error::EmptyData(_)
            | Error::InvalidData(_) => ErrorKind::AnalysisFailure,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
