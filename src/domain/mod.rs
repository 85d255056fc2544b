//! Domain types shared by the lotledger tools.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Wall-clock Timestamp parsing and formatting
//! - Primitives: Asset, PositionSide, AccountingMethod, RecordType
//! - TradeRecord / BalanceRecord value types with stable record keys
//! - AssetLot, the unit of open exposure

pub mod decimal;
pub mod lot;
pub mod primitives;
pub mod record;
pub mod timestamp;

pub use decimal::Decimal;
pub use lot::AssetLot;
pub use primitives::{AccountingMethod, Asset, PositionSide, RecordType};
pub use record::{BalanceRecord, TradeRecord};
pub use timestamp::Timestamp;
