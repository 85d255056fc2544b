//! Day-level consolidation of exchange exports.
//!
//! Many exchanges emit dozens of partial executions for what is logically
//! one daily transaction. The aggregator merges consecutive records that
//! agree on everything but amounts within one calendar day, then normalizes
//! timestamps so daily entries sort predictably.

use chrono::NaiveTime;

use crate::domain::{RecordType, Timestamp, TradeRecord};

/// Currency sets used to recognize a coin buy for timestamp normalization.
const CRYPTO_CURRENCIES: &[&str] = &[
    "BTC", "ETH", "ADA", "SOL2", "LUNA2", "LUNA3", "DFI", "BNB", "XRP", "KFEE",
];
const STABLECOINS: &[&str] = &["USDC", "USDT", "BUSD"];
const FIAT_CURRENCIES: &[&str] = &["EUR", "USD"];

/// Merges same-day record runs and normalizes their timestamps.
#[derive(Debug, Default)]
pub struct DayAggregator;

impl DayAggregator {
    pub fn new() -> Self {
        DayAggregator
    }

    /// Consolidate mergeable records, normalize timestamps, and re-sort
    /// chronologically.
    ///
    /// Records are first ordered by their merge criteria so that mergeable
    /// rows are consecutive regardless of input order. A merged record
    /// keeps the fields of the last record of its run, sums the
    /// buy/sell/fee amounts over the run, and loses its tx id (the merged
    /// row no longer corresponds to any single exchange transaction).
    pub fn aggregate(&self, mut records: Vec<TradeRecord>) -> Vec<TradeRecord> {
        if records.len() <= 1 {
            return records;
        }

        records.sort_by(|a, b| Self::grouping_key(a).cmp(&Self::grouping_key(b)));

        let input_len = records.len();
        let mut result: Vec<TradeRecord> = Vec::new();
        let mut run: Vec<TradeRecord> = Vec::new();

        for record in records {
            if let Some(last) = run.last() {
                if !Self::is_mergeable(last, &record) {
                    result.push(Self::merge_run(std::mem::take(&mut run)));
                }
            }
            run.push(record);
        }
        if !run.is_empty() {
            result.push(Self::merge_run(run));
        }

        let mut result: Vec<TradeRecord> =
            result.into_iter().map(Self::normalize_timestamp).collect();
        result.sort_by(|a, b| a.date.cmp(&b.date));

        tracing::info!(
            input = input_len,
            output = result.len(),
            "aggregation complete"
        );

        result
    }

    /// Ordering that brings mergeable records together, days in order
    /// within each group.
    fn grouping_key(r: &TradeRecord) -> (&str, &str, &str, &str, &str, &str, &str, Timestamp) {
        (
            r.record_type.as_str(),
            r.buy_currency.as_str(),
            r.sell_currency.as_str(),
            r.fee_currency.as_str(),
            r.exchange.as_str(),
            r.group.as_str(),
            r.comment.as_str(),
            r.date,
        )
    }

    /// Two records merge when they agree on everything that identifies a
    /// daily entry: type, the three currencies, exchange, group, comment,
    /// and the calendar day.
    fn is_mergeable(a: &TradeRecord, b: &TradeRecord) -> bool {
        a.record_type == b.record_type
            && a.buy_currency == b.buy_currency
            && a.sell_currency == b.sell_currency
            && a.fee_currency == b.fee_currency
            && a.exchange == b.exchange
            && a.group == b.group
            && a.comment == b.comment
            && a.date.day() == b.date.day()
    }

    /// Collapse a run into its last record with summed amounts.
    fn merge_run(run: Vec<TradeRecord>) -> TradeRecord {
        let merged = run.len() > 1;
        let mut iter = run.into_iter();
        let mut out = iter.next_back().expect("merge_run on an empty run");

        for earlier in iter {
            out.buy_amount += earlier.buy_amount;
            out.sell_amount += earlier.sell_amount;
            out.fee_amount += earlier.fee_amount;
        }
        if merged {
            out.tx_id = None;
        }
        out
    }

    /// Normalize the time-of-day by business meaning: deposits land on
    /// 00:00:00, coin buys on 00:01:00, so a day's deposit always sorts
    /// before the buy it funded.
    fn normalize_timestamp(record: TradeRecord) -> TradeRecord {
        let time = match record.record_type {
            RecordType::Deposit => NaiveTime::from_hms_opt(0, 0, 0),
            RecordType::Trade if Self::is_coin_buy(&record) => NaiveTime::from_hms_opt(0, 1, 0),
            _ => None,
        };

        match time {
            Some(time) => TradeRecord {
                date: record.date.with_time(time),
                ..record
            },
            None => record,
        }
    }

    /// A coin buy: crypto acquired against fiat or a stablecoin.
    fn is_coin_buy(record: &TradeRecord) -> bool {
        let buy = record.buy_currency.as_str();
        let sell = record.sell_currency.as_str();

        CRYPTO_CURRENCIES.contains(&buy)
            && (FIAT_CURRENCIES.contains(&sell) || STABLECOINS.contains(&sell))
    }
}
