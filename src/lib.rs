//! Cost-basis ledger tools for exchange trade exports.
//!
//! The core is the lot-matching engine: a deterministic batch computation
//! pairing closing trades against open lots under FIFO or LIFO and emitting
//! realized matches plus a snapshot of still-open positions. Around it sit
//! the balance calculator, the day-level aggregator, and the CSV
//! import/export plumbing the tools are built from.

pub mod aggregate;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod export;
pub mod tools;

pub use config::Config;
pub use datasource::{CoinTrackingCsvSource, MockSource, RecordSource};
pub use domain::{
    AccountingMethod, Asset, AssetLot, BalanceRecord, Decimal, PositionSide, RecordType,
    Timestamp, TradeRecord,
};
pub use engine::{
    BalanceCalculator, EngineError, LotBook, MatchingEngine, OpenLotSnapshot, RealizedMatch,
};
pub use error::AppError;
