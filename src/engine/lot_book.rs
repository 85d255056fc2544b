//! Time-ordered book of open lots for one asset.

use std::collections::VecDeque;

use crate::domain::{AccountingMethod, AssetLot, Decimal};

use super::OpenLotSnapshot;

/// Ordered collection of open lots, oldest at the front.
///
/// Both consumption policies are O(1): FIFO closes from the front, LIFO from
/// the back. Exactly one book exists per asset during a run, owned by the
/// matching engine.
#[derive(Debug, Default)]
pub struct LotBook {
    lots: VecDeque<AssetLot>,
}

impl LotBook {
    pub fn new() -> Self {
        LotBook {
            lots: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    /// Append a newly opened lot as the most recent entry.
    pub fn push(&mut self, lot: AssetLot) {
        debug_assert!(!lot.is_exhausted(), "opened lot must have remaining > 0");
        self.lots.push_back(lot);
    }

    /// The lot the given policy would consume next, if any.
    pub fn peek_consumable(&self, method: AccountingMethod) -> Option<&AssetLot> {
        match method {
            AccountingMethod::Fifo => self.lots.front(),
            AccountingMethod::Lifo => self.lots.back(),
        }
    }

    /// Consume `amount` from the next lot under the given policy.
    ///
    /// The lot is replaced by its reduced value, or removed the moment its
    /// remaining amount reaches zero; a zero-remaining lot never stays in
    /// the book.
    ///
    /// # Panics
    /// Panics if the book is empty or `amount` exceeds the next lot's
    /// remaining amount. Callers check `peek_consumable` first and never
    /// request more than `remaining`.
    pub fn reduce(&mut self, method: AccountingMethod, amount: Decimal) {
        let lot = match method {
            AccountingMethod::Fifo => self.lots.pop_front(),
            AccountingMethod::Lifo => self.lots.pop_back(),
        }
        .expect("reduce on an empty lot book");
        assert!(
            amount <= lot.remaining,
            "reduce amount exceeds lot remaining"
        );

        let reduced = lot.reduced_by(amount);
        if !reduced.is_exhausted() {
            match method {
                AccountingMethod::Fifo => self.lots.push_front(reduced),
                AccountingMethod::Lifo => self.lots.push_back(reduced),
            }
        }
    }

    /// Snapshot of all held lots in book order (oldest first).
    pub fn snapshot(&self) -> Vec<OpenLotSnapshot> {
        self.lots
            .iter()
            .map(|lot| OpenLotSnapshot {
                asset: lot.asset.clone(),
                side: lot.side,
                open_date: lot.open_date,
                remaining: lot.remaining,
                open_price: lot.open_price,
                currency: lot.currency.clone(),
                value_at_open: lot.remaining * lot.open_price,
            })
            .collect()
    }
}
