//! Record sources feeding the batch tools.

use thiserror::Error;

use crate::domain::TradeRecord;

pub mod cointracking;
pub mod mock;

pub use cointracking::CoinTrackingCsvSource;
pub use mock::MockSource;

/// A source of validated trade records.
///
/// Everything downstream of this trait may assume records are well-typed:
/// parse failures stay on this side of the seam.
pub trait RecordSource {
    fn load(&self) -> Result<Vec<TradeRecord>, DataSourceError>;
}

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error in {path}: {message}")]
    Csv { path: String, message: String },
    #[error("row {row}: invalid decimal in column {column}: {value}")]
    InvalidDecimal {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: invalid date {value} (expected format {format})")]
    InvalidDate {
        row: usize,
        value: String,
        format: String,
    },
}
