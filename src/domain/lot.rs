//! Open-exposure lots awaiting a closing trade.

use serde::{Deserialize, Serialize};

use crate::domain::{Asset, Decimal, PositionSide, Timestamp};

/// A block of opened, not-yet-fully-closed exposure.
///
/// Value type: reducing a lot returns an updated copy rather than mutating
/// state other holders could observe. A lot with `remaining` zero must not
/// stay in any book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLot {
    pub asset: Asset,
    pub side: PositionSide,
    pub open_date: Timestamp,
    /// Amount at open; never changes afterwards.
    pub amount: Decimal,
    /// Amount not yet closed. 0 <= remaining <= amount.
    pub remaining: Decimal,
    /// Unit price at open, in `currency`.
    pub open_price: Decimal,
    /// Quote currency of the opening trade's other leg.
    pub currency: Asset,
    /// Key of the record that opened this lot.
    pub source_key: String,
}

impl AssetLot {
    /// The lot after consuming `matched` of its remaining amount.
    ///
    /// Callers must never consume more than `remaining`; the book enforces
    /// this before calling.
    pub fn reduced_by(&self, matched: Decimal) -> AssetLot {
        debug_assert!(matched <= self.remaining);
        AssetLot {
            remaining: self.remaining - matched,
            ..self.clone()
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_zero()
    }

    /// True if some but not all of the original amount has been closed.
    pub fn is_partially_closed(&self) -> bool {
        !self.remaining.is_zero() && self.remaining < self.amount
    }
}
