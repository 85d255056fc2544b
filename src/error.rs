use thiserror::Error;

use crate::config::ConfigError;
use crate::datasource::DataSourceError;
use crate::engine::EngineError;
use crate::export::ExportError;

/// Top-level error for a tool run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("import error: {0}")]
    DataSource(#[from] DataSourceError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}
