//! Domain primitives: Asset, PositionSide, AccountingMethod, RecordType.

use serde::{Deserialize, Serialize};

/// Currency or coin symbol (e.g. "ADA", "EUR", "USDT").
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Asset(pub String);

impl Asset {
    pub fn new(symbol: impl Into<String>) -> Self {
        Asset(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Asset {
    fn from(s: &str) -> Self {
        Asset(s.to_string())
    }
}

/// Side of an open lot.
///
/// Every side-dependent branch matches this exhaustively, so a third side
/// would surface as a compile error at each decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// Stable token used in report CSVs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSide::Long => "LONG",
            PositionSide::Short => "SHORT",
        }
    }

    /// The side of exposure an incoming trade of this direction can close.
    /// A buy closes short exposure; a sell closes long exposure.
    pub fn opposite(&self) -> Self {
        match self {
            PositionSide::Long => PositionSide::Short,
            PositionSide::Short => PositionSide::Long,
        }
    }
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lot consumption policy: which end of the book closes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountingMethod {
    /// First in, first out: the oldest lot is consumed first.
    Fifo,
    /// Last in, first out: the most recent lot is consumed first.
    Lifo,
}

impl AccountingMethod {
    /// Stable token used in config files and report CSVs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountingMethod::Fifo => "FIFO",
            AccountingMethod::Lifo => "LIFO",
        }
    }
}

impl std::fmt::Display for AccountingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record type tag from the export.
///
/// Only `Trade` is relevant to lot matching; the other variants still flow
/// through the balance calculator and the aggregator. `Other` preserves
/// labels this crate has no special handling for (e.g. "Reward / Bonus"),
/// so re-exported CSVs keep the original tag verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RecordType {
    Trade,
    Deposit,
    Withdrawal,
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::Trade => "Trade",
            RecordType::Deposit => "Deposit",
            RecordType::Withdrawal => "Withdrawal",
            RecordType::Other(label) => label,
        }
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Trade" => RecordType::Trade,
            "Deposit" => RecordType::Deposit,
            "Withdrawal" => RecordType::Withdrawal,
            _ => RecordType::Other(s),
        }
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        RecordType::from(s.to_string())
    }
}

impl From<RecordType> for String {
    fn from(t: RecordType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
