//! Pure computation engines for deterministic batch runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AccountingMethod, Asset, Decimal, PositionSide, Timestamp};

pub mod balance;
pub mod lot_book;
pub mod matcher;

pub use balance::BalanceCalculator;
pub use lot_book::LotBook;
pub use matcher::MatchingEngine;

/// A realized match between a closing trade and an open lot.
///
/// Append-only output: once emitted it is never revised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealizedMatch {
    pub asset: Asset,
    /// Side of the lot that was closed.
    pub side: PositionSide,
    pub open_date: Timestamp,
    pub close_date: Timestamp,
    /// Matched amount, always > 0.
    pub amount: Decimal,
    pub open_price: Decimal,
    pub close_price: Decimal,
    /// Quote currency of both prices and the PnL.
    pub currency: Asset,
    /// Signed realized profit. Long: (close - open) * amount.
    /// Short: (open - close) * amount. Fees are not subtracted here.
    pub pnl: Decimal,
    pub method: AccountingMethod,
}

/// Read-only view of a lot still open when processing ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLotSnapshot {
    pub asset: Asset,
    pub side: PositionSide,
    pub open_date: Timestamp,
    pub remaining: Decimal,
    pub open_price: Decimal,
    pub currency: Asset,
    /// remaining * open_price.
    pub value_at_open: Decimal,
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// A Trade whose directional leg amount is zero: the unit price would be
    /// a division by zero. The run aborts; no partial output is returned.
    #[error("trade {record_key} at {date} has a zero amount on its {asset} leg")]
    ZeroAmountTrade {
        record_key: String,
        date: Timestamp,
        asset: Asset,
    },
}
