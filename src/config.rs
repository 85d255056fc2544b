//! Tool configuration loaded from a JSON file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::timestamp::DEFAULT_DATE_FORMAT;
use crate::domain::{AccountingMethod, Asset};

/// Validated configuration for one tool run.
#[derive(Debug, Clone)]
pub struct Config {
    pub import_file: PathBuf,
    pub export_file: Option<PathBuf>,
    pub export_pnl_file: Option<PathBuf>,
    pub export_open_lots_file: Option<PathBuf>,
    pub data_format: DataFormat,
    pub ct_exchanges: Vec<String>,
    pub ct_year: Option<String>,
    pub coin: Asset,
    pub currency: Option<Asset>,
    /// Only the pnl tool needs this; it errors out when unset.
    pub accounting_method: Option<AccountingMethod>,
    pub decimal_separator: char,
    pub date_format: String,
}

/// Known import formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    CoinTracking,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path} contains invalid JSON: {message}")]
    Json { path: String, message: String },
    #[error("missing required config value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Raw JSON shape before validation. `ct_exchanges` accepts a single string
/// or a list; `ct_year` accepts a string or a bare number.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    import_file: Option<PathBuf>,
    export_file: Option<PathBuf>,
    export_pnl_file: Option<PathBuf>,
    export_open_lots_file: Option<PathBuf>,
    data_format: Option<String>,
    ct_exchanges: Option<StringOrList>,
    ct_year: Option<StringOrNumber>,
    coin: Option<String>,
    currency: Option<String>,
    accounting_method: Option<String>,
    decimal_separator: Option<String>,
    date_format: Option<String>,
    // Tolerated and ignored, so shared config files can carry extra keys.
    #[serde(flatten)]
    _rest: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(i64),
}

impl Config {
    /// Load and validate a config file. All validation happens here, before
    /// any processing starts.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: display.clone(),
            source: e,
        })?;
        Self::from_json_str(&content).map_err(|e| match e {
            ConfigError::Json { message, .. } => ConfigError::Json {
                path: display,
                message,
            },
            other => other,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(content).map_err(|e| ConfigError::Json {
            path: String::new(),
            message: e.to_string(),
        })?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        let import_file = raw
            .import_file
            .ok_or(ConfigError::MissingValue("import_file"))?;

        let coin = raw
            .coin
            .filter(|c| !c.is_empty())
            .map(Asset::new)
            .ok_or(ConfigError::MissingValue("coin"))?;

        let data_format = match raw.data_format.as_deref() {
            None | Some("") | Some("CoinTracking") => DataFormat::CoinTracking,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "data_format",
                    format!("unknown format {}", other),
                ))
            }
        };

        let accounting_method = match raw.accounting_method.as_deref() {
            None | Some("") => None,
            Some("FIFO") => Some(AccountingMethod::Fifo),
            Some("LIFO") => Some(AccountingMethod::Lifo),
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "accounting_method",
                    format!("must be FIFO or LIFO, got {}", other),
                ))
            }
        };

        let decimal_separator = match raw.decimal_separator.as_deref() {
            None | Some("") => '.',
            Some(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c @ ('.' | ',')), None) => c,
                    _ => {
                        return Err(ConfigError::InvalidValue(
                            "decimal_separator",
                            format!("must be '.' or ',', got {}", s),
                        ))
                    }
                }
            }
        };

        let ct_exchanges = match raw.ct_exchanges {
            None => Vec::new(),
            Some(StringOrList::One(s)) if s.is_empty() => Vec::new(),
            Some(StringOrList::One(s)) => vec![s],
            Some(StringOrList::Many(list)) => list,
        };

        let ct_year = raw.ct_year.map(|y| match y {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        });

        Ok(Config {
            import_file,
            export_file: raw.export_file,
            export_pnl_file: raw.export_pnl_file,
            export_open_lots_file: raw.export_open_lots_file,
            data_format,
            ct_exchanges,
            ct_year,
            coin,
            currency: raw.currency.filter(|c| !c.is_empty()).map(Asset::new),
            accounting_method,
            decimal_separator,
            date_format: raw
                .date_format
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
        })
    }

    /// The accounting method, required for lot matching.
    pub fn require_accounting_method(&self) -> Result<AccountingMethod, ConfigError> {
        self.accounting_method
            .ok_or(ConfigError::MissingValue("accounting_method"))
    }
}
