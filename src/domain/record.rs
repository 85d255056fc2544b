//! Trade records as handed to the tools by the importer.

use serde::{Deserialize, Serialize};

use crate::domain::{Asset, Decimal, RecordType, Timestamp};

/// One validated row of an exchange export.
///
/// Immutable once constructed; the aggregator and the engine derive new
/// values instead of mutating records in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub record_type: RecordType,
    pub buy_amount: Decimal,
    pub buy_currency: Asset,
    pub sell_amount: Decimal,
    pub sell_currency: Asset,
    pub fee_amount: Decimal,
    pub fee_currency: Asset,
    pub exchange: String,
    pub group: String,
    pub comment: String,
    pub date: Timestamp,
    /// External transaction id, empty for synthetic (e.g. aggregated) records.
    pub tx_id: Option<String>,
}

impl TradeRecord {
    /// Stable identity of this record.
    ///
    /// Priority: external tx id if present, otherwise a hash over the
    /// deterministic fields.
    pub fn record_key(&self) -> String {
        if let Some(tx_id) = self.tx_id.as_deref() {
            if !tx_id.is_empty() {
                return format!("tx:{}", tx_id);
            }
        }

        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.record_type.as_str());
        hasher.update(self.buy_amount.to_canonical_string());
        hasher.update(self.buy_currency.as_str());
        hasher.update(self.sell_amount.to_canonical_string());
        hasher.update(self.sell_currency.as_str());
        hasher.update(self.fee_amount.to_canonical_string());
        hasher.update(self.fee_currency.as_str());
        hasher.update(&self.exchange);
        hasher.update(&self.group);
        hasher.update(&self.comment);
        hasher.update(self.date.to_string());
        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }

    /// True if the asset appears on the buy or sell leg.
    ///
    /// Fee-only involvement does not count: it moves balances but never
    /// opens or closes lots.
    pub fn trades_asset(&self, asset: &Asset) -> bool {
        &self.buy_currency == asset || &self.sell_currency == asset
    }
}

/// A trade record annotated with the running balance of the tracked asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub record_type: RecordType,
    pub buy_amount: Decimal,
    pub buy_currency: Asset,
    pub sell_amount: Decimal,
    pub sell_currency: Asset,
    pub fee_amount: Decimal,
    pub fee_currency: Asset,
    pub exchange: String,
    pub group: String,
    pub comment: String,
    pub date: Timestamp,
    pub balance: Decimal,
    pub balance_currency: Asset,
}

impl BalanceRecord {
    /// Annotate a record with the balance after applying it.
    pub fn from_record(record: &TradeRecord, balance: Decimal, balance_currency: Asset) -> Self {
        BalanceRecord {
            record_type: record.record_type.clone(),
            buy_amount: record.buy_amount,
            buy_currency: record.buy_currency.clone(),
            sell_amount: record.sell_amount,
            sell_currency: record.sell_currency.clone(),
            fee_amount: record.fee_amount,
            fee_currency: record.fee_currency.clone(),
            exchange: record.exchange.clone(),
            group: record.group.clone(),
            comment: record.comment.clone(),
            date: record.date,
            balance,
            balance_currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timestamp::DEFAULT_DATE_FORMAT;

    fn record(tx_id: Option<&str>) -> TradeRecord {
        TradeRecord {
            record_type: RecordType::Trade,
            buy_amount: Decimal::parse("10").unwrap(),
            buy_currency: Asset::new("ADA"),
            sell_amount: Decimal::parse("10").unwrap(),
            sell_currency: Asset::new("EUR"),
            fee_amount: Decimal::zero(),
            fee_currency: Asset::default(),
            exchange: "Kraken".to_string(),
            group: String::new(),
            comment: String::new(),
            date: Timestamp::parse("2026-01-02 13:45:00", DEFAULT_DATE_FORMAT).unwrap(),
            tx_id: tx_id.map(str::to_string),
        }
    }

    #[test]
    fn test_record_key_prefers_tx_id() {
        assert_eq!(record(Some("abc123")).record_key(), "tx:abc123");
    }

    #[test]
    fn test_record_key_hash_fallback() {
        let key = record(None).record_key();
        assert!(key.starts_with("hash:"));
        assert_eq!(key.len(), 5 + 32);
    }

    #[test]
    fn test_record_key_empty_tx_id_falls_back_to_hash() {
        assert!(record(Some("")).record_key().starts_with("hash:"));
    }

    #[test]
    fn test_record_key_deterministic() {
        assert_eq!(record(None).record_key(), record(None).record_key());
    }

    #[test]
    fn test_record_key_differs_by_field() {
        let a = record(None);
        let mut b = record(None);
        b.buy_amount = Decimal::parse("11").unwrap();
        assert_ne!(a.record_key(), b.record_key());
    }

    #[test]
    fn test_trades_asset_ignores_fee_leg() {
        let mut r = record(None);
        r.fee_currency = Asset::new("BNB");
        assert!(r.trades_asset(&Asset::new("ADA")));
        assert!(r.trades_asset(&Asset::new("EUR")));
        assert!(!r.trades_asset(&Asset::new("BNB")));
    }

    #[test]
    fn test_serde_roundtrip() {
        let r = record(Some("abc"));
        let json = serde_json::to_string(&r).unwrap();
        let back: TradeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
