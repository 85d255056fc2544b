//! Running-balance tracking for one asset.

use crate::domain::{Asset, BalanceRecord, Decimal, TradeRecord};

/// Single linear scan accumulating the signed delta of the tracked asset.
///
/// Unlike lot matching, every record type participates: deposits add,
/// withdrawals subtract, and fees paid in the asset reduce the balance.
pub struct BalanceCalculator {
    asset: Asset,
}

impl BalanceCalculator {
    pub fn new(asset: Asset) -> Self {
        BalanceCalculator { asset }
    }

    /// Annotate each balance-affecting record with the running balance.
    ///
    /// Records that do not move the asset's balance are dropped from the
    /// output.
    pub fn track_balance(&self, records: &[TradeRecord]) -> Vec<BalanceRecord> {
        let mut balance = Decimal::zero();
        let mut result = Vec::new();

        for record in records {
            let mut delta = Decimal::zero();

            if record.buy_currency == self.asset {
                delta += record.buy_amount;
            }
            if record.sell_currency == self.asset {
                delta -= record.sell_amount;
            }
            if record.fee_currency == self.asset {
                delta -= record.fee_amount;
            }

            if delta.is_zero() {
                continue;
            }

            balance += delta;
            result.push(BalanceRecord::from_record(
                record,
                balance,
                self.asset.clone(),
            ));
        }

        tracing::info!(
            asset = %self.asset,
            records = result.len(),
            final_balance = %balance,
            "balance scan complete"
        );

        result
    }
}
