//! Cost-basis matching of closing trades against open lots.

use std::collections::BTreeMap;

use crate::domain::{
    AccountingMethod, Asset, AssetLot, Decimal, PositionSide, RecordType, TradeRecord,
};

use super::{EngineError, LotBook, OpenLotSnapshot, RealizedMatch};

/// Drives one batch run: classifies each trade chronologically, closes
/// opposing lots per the configured policy, and opens new lots for whatever
/// stays unmatched.
///
/// The per-asset books are constructed fresh for the run and owned
/// exclusively by this instance; `calculate` consumes the engine, so an
/// aborted run can never leak a half-mutated book.
pub struct MatchingEngine {
    asset: Asset,
    method: AccountingMethod,
    books: BTreeMap<Asset, LotBook>,
    matches: Vec<RealizedMatch>,
}

impl MatchingEngine {
    pub fn new(asset: Asset, method: AccountingMethod) -> Self {
        MatchingEngine {
            asset,
            method,
            books: BTreeMap::new(),
            matches: Vec::new(),
        }
    }

    /// Process all records and return the realized matches plus a snapshot
    /// of the lots still open at the end.
    ///
    /// Records need not be pre-sorted; a stable sort by timestamp keeps
    /// input order for equal timestamps. Matches come out in close-time
    /// order because processing is chronological. Given the same records
    /// and method the output is bit-for-bit reproducible.
    pub fn calculate(
        mut self,
        mut records: Vec<TradeRecord>,
    ) -> Result<(Vec<RealizedMatch>, Vec<OpenLotSnapshot>), EngineError> {
        records.sort_by(|a, b| a.date.cmp(&b.date));

        for record in &records {
            // Fee-only involvement moves balances, not lots.
            if !record.trades_asset(&self.asset) {
                continue;
            }
            // Deposits, transfers, margin fees etc. are the balance
            // calculator's concern, not lot matching's.
            if record.record_type != RecordType::Trade {
                continue;
            }
            self.process_trade(record)?;
        }

        let open_lots: Vec<OpenLotSnapshot> = self
            .books
            .values()
            .flat_map(|book| book.snapshot())
            .collect();

        tracing::info!(
            asset = %self.asset,
            method = %self.method,
            matches = self.matches.len(),
            open_lots = open_lots.len(),
            "matching run complete"
        );

        Ok((self.matches, open_lots))
    }

    /// Close opposing lots with this trade's directional amount, then open
    /// a new lot with whatever is left.
    fn process_trade(&mut self, record: &TradeRecord) -> Result<(), EngineError> {
        let is_buy = record.buy_currency == self.asset;
        let directional_amount = if is_buy {
            record.buy_amount
        } else {
            record.sell_amount
        };

        // Guard before any book mutation: a zero directional leg would make
        // the unit price a division by zero.
        if directional_amount.is_zero() {
            return Err(EngineError::ZeroAmountTrade {
                record_key: record.record_key(),
                date: record.date,
                asset: self.asset.clone(),
            });
        }

        // Unit price is the other leg over the directional leg: cost paid
        // per unit acquired when buying, proceeds per unit disposed when
        // selling. The other leg's currency quotes the price.
        let (price, quote_currency) = if is_buy {
            (
                record.sell_amount / record.buy_amount,
                record.sell_currency.clone(),
            )
        } else {
            (
                record.buy_amount / record.sell_amount,
                record.buy_currency.clone(),
            )
        };

        let needed_side = if is_buy {
            PositionSide::Short
        } else {
            PositionSide::Long
        };

        let book = self.books.entry(self.asset.clone()).or_default();
        let mut unmatched = directional_amount;

        // Closing pass: consume opposing lots until the trade is exhausted
        // or the next consumable lot is not of the needed side.
        while unmatched.is_positive() {
            let Some(lot) = book.peek_consumable(self.method) else {
                break;
            };
            if lot.side != needed_side {
                break;
            }

            let match_amount = unmatched.min(lot.remaining);
            self.matches.push(RealizedMatch {
                asset: self.asset.clone(),
                side: lot.side,
                open_date: lot.open_date,
                close_date: record.date,
                amount: match_amount,
                open_price: lot.open_price,
                close_price: price,
                currency: quote_currency.clone(),
                pnl: realized_pnl(lot.side, match_amount, lot.open_price, price),
                method: self.method,
            });

            book.reduce(self.method, match_amount);
            unmatched -= match_amount;
        }

        // Opening pass: leftover directional amount becomes a new lot.
        if unmatched.is_positive() {
            let side = if is_buy {
                PositionSide::Long
            } else {
                PositionSide::Short
            };
            book.push(AssetLot {
                asset: self.asset.clone(),
                side,
                open_date: record.date,
                amount: unmatched,
                remaining: unmatched,
                open_price: price,
                currency: quote_currency,
                source_key: record.record_key(),
            });
        }

        Ok(())
    }
}

/// Signed profit of closing `amount` of a lot.
///
/// Fees are intentionally not part of this formula; they stay on the record
/// for downstream consumers.
fn realized_pnl(
    side: PositionSide,
    amount: Decimal,
    open_price: Decimal,
    close_price: Decimal,
) -> Decimal {
    match side {
        PositionSide::Long => (close_price - open_price) * amount,
        PositionSide::Short => (open_price - close_price) * amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timestamp::DEFAULT_DATE_FORMAT;
    use crate::domain::Timestamp;

    fn trade(date: &str, buy: &str, buy_cur: &str, sell: &str, sell_cur: &str) -> TradeRecord {
        TradeRecord {
            record_type: RecordType::Trade,
            buy_amount: Decimal::parse(buy).unwrap(),
            buy_currency: Asset::new(buy_cur),
            sell_amount: Decimal::parse(sell).unwrap(),
            sell_currency: Asset::new(sell_cur),
            fee_amount: Decimal::zero(),
            fee_currency: Asset::default(),
            exchange: "Kraken".to_string(),
            group: String::new(),
            comment: String::new(),
            date: Timestamp::parse(date, DEFAULT_DATE_FORMAT).unwrap(),
            tx_id: None,
        }
    }

    fn engine(method: AccountingMethod) -> MatchingEngine {
        MatchingEngine::new(Asset::new("ADA"), method)
    }

    #[test]
    fn test_buy_then_partial_sell_fifo() {
        // Buy 10 ADA for 10 USD, sell 6 ADA for 9 USD.
        let records = vec![
            trade("2026-01-01 00:00:00", "10", "ADA", "10", "USD"),
            trade("2026-01-02 00:00:00", "9", "USD", "6", "ADA"),
        ];

        let (matches, open) = engine(AccountingMethod::Fifo).calculate(records).unwrap();

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.side, PositionSide::Long);
        assert_eq!(m.amount.to_canonical_string(), "6");
        assert_eq!(m.open_price.to_canonical_string(), "1");
        assert_eq!(m.close_price.to_canonical_string(), "1.5");
        assert_eq!(m.pnl.to_canonical_string(), "3");
        assert_eq!(m.currency.as_str(), "USD");
        assert_eq!(m.method, AccountingMethod::Fifo);

        assert_eq!(open.len(), 1);
        assert_eq!(open[0].side, PositionSide::Long);
        assert_eq!(open[0].remaining.to_canonical_string(), "4");
        assert_eq!(open[0].open_price.to_canonical_string(), "1");
    }

    #[test]
    fn test_fifo_lifo_divergence() {
        // Buy 5 @ 1.0, buy 5 @ 2.0, sell 5 @ 3.0.
        let records = || {
            vec![
                trade("2026-01-01 00:00:00", "5", "ADA", "5", "USD"),
                trade("2026-01-02 00:00:00", "5", "ADA", "10", "USD"),
                trade("2026-01-03 00:00:00", "15", "USD", "5", "ADA"),
            ]
        };

        let (fifo_matches, fifo_open) =
            engine(AccountingMethod::Fifo).calculate(records()).unwrap();
        assert_eq!(fifo_matches.len(), 1);
        assert_eq!(fifo_matches[0].pnl.to_canonical_string(), "10");
        assert_eq!(fifo_open.len(), 1);
        assert_eq!(fifo_open[0].open_price.to_canonical_string(), "2");

        let (lifo_matches, lifo_open) =
            engine(AccountingMethod::Lifo).calculate(records()).unwrap();
        assert_eq!(lifo_matches.len(), 1);
        assert_eq!(lifo_matches[0].pnl.to_canonical_string(), "5");
        assert_eq!(lifo_open.len(), 1);
        assert_eq!(lifo_open[0].open_price.to_canonical_string(), "1");
    }

    #[test]
    fn test_sell_with_no_lots_opens_short() {
        // Sell 3 @ 2.0 flat, buy back 3 @ 1.0.
        let records = vec![
            trade("2026-01-01 00:00:00", "6", "USD", "3", "ADA"),
            trade("2026-01-02 00:00:00", "3", "ADA", "3", "USD"),
        ];

        let (matches, open) = engine(AccountingMethod::Fifo).calculate(records).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].side, PositionSide::Short);
        assert_eq!(matches[0].pnl.to_canonical_string(), "3");
        assert!(open.is_empty());
    }

    #[test]
    fn test_one_sell_consumes_multiple_lots() {
        let records = vec![
            trade("2026-01-01 00:00:00", "5", "ADA", "5", "USD"),
            trade("2026-01-02 00:00:00", "5", "ADA", "10", "USD"),
            trade("2026-01-03 00:00:00", "16", "USD", "8", "ADA"),
        ];

        let (matches, open) = engine(AccountingMethod::Fifo).calculate(records).unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].amount.to_canonical_string(), "5");
        assert_eq!(matches[0].open_price.to_canonical_string(), "1");
        assert_eq!(matches[1].amount.to_canonical_string(), "3");
        assert_eq!(matches[1].open_price.to_canonical_string(), "2");

        assert_eq!(open.len(), 1);
        assert_eq!(open[0].remaining.to_canonical_string(), "2");
    }

    #[test]
    fn test_oversized_close_flips_side() {
        // Long 5, then sell 8: closes 5 and opens a short of 3.
        let records = vec![
            trade("2026-01-01 00:00:00", "5", "ADA", "5", "USD"),
            trade("2026-01-02 00:00:00", "16", "USD", "8", "ADA"),
        ];

        let (matches, open) = engine(AccountingMethod::Fifo).calculate(records).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].amount.to_canonical_string(), "5");
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].side, PositionSide::Short);
        assert_eq!(open[0].remaining.to_canonical_string(), "3");
        assert_eq!(open[0].open_price.to_canonical_string(), "2");
    }

    #[test]
    fn test_same_side_lots_are_never_consumed_to_open() {
        // Two buys in a row must stack lots, not match each other.
        let records = vec![
            trade("2026-01-01 00:00:00", "5", "ADA", "5", "USD"),
            trade("2026-01-02 00:00:00", "5", "ADA", "10", "USD"),
        ];

        let (matches, open) = engine(AccountingMethod::Fifo).calculate(records).unwrap();

        assert!(matches.is_empty());
        assert_eq!(open.len(), 2);
    }

    #[test]
    fn test_irrelevant_and_non_trade_records_skipped() {
        let mut deposit = trade("2026-01-01 00:00:00", "10", "ADA", "0", "");
        deposit.record_type = RecordType::Deposit;
        let other_pair = trade("2026-01-02 00:00:00", "1", "BTC", "100", "USD");

        let (matches, open) = engine(AccountingMethod::Fifo)
            .calculate(vec![deposit, other_pair])
            .unwrap();

        assert!(matches.is_empty());
        assert!(open.is_empty());
    }

    #[test]
    fn test_zero_buy_leg_rejected() {
        let records = vec![trade("2026-01-01 00:00:00", "0", "ADA", "10", "USD")];
        let err = engine(AccountingMethod::Fifo).calculate(records).unwrap_err();
        assert!(matches!(err, EngineError::ZeroAmountTrade { .. }));
    }

    #[test]
    fn test_zero_sell_leg_rejected() {
        let records = vec![trade("2026-01-01 00:00:00", "10", "USD", "0", "ADA")];
        let err = engine(AccountingMethod::Fifo).calculate(records).unwrap_err();
        assert!(matches!(err, EngineError::ZeroAmountTrade { .. }));
    }

    #[test]
    fn test_unsorted_input_is_sorted_by_date() {
        let records = vec![
            trade("2026-01-02 00:00:00", "9", "USD", "6", "ADA"),
            trade("2026-01-01 00:00:00", "10", "ADA", "10", "USD"),
        ];

        let (matches, _) = engine(AccountingMethod::Fifo).calculate(records).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pnl.to_canonical_string(), "3");
    }

    #[test]
    fn test_fees_do_not_affect_pnl() {
        let mut buy = trade("2026-01-01 00:00:00", "10", "ADA", "10", "USD");
        buy.fee_amount = Decimal::parse("0.5").unwrap();
        buy.fee_currency = Asset::new("USD");
        let mut sell = trade("2026-01-02 00:00:00", "9", "USD", "6", "ADA");
        sell.fee_amount = Decimal::parse("0.5").unwrap();
        sell.fee_currency = Asset::new("USD");

        let (matches, _) = engine(AccountingMethod::Fifo)
            .calculate(vec![buy, sell])
            .unwrap();

        // Same result as the fee-free run: fees stay on the record.
        assert_eq!(matches[0].pnl.to_canonical_string(), "3");
    }

    #[test]
    fn test_realized_pnl_signs() {
        let two = Decimal::parse("2").unwrap();
        let three = Decimal::parse("3").unwrap();
        let five = Decimal::parse("5").unwrap();

        assert!(realized_pnl(PositionSide::Long, five, two, three).is_positive());
        assert!(realized_pnl(PositionSide::Long, five, three, two).is_negative());
        assert!(realized_pnl(PositionSide::Short, five, three, two).is_positive());
        assert!(realized_pnl(PositionSide::Short, five, two, three).is_negative());
        assert!(realized_pnl(PositionSide::Long, five, two, two).is_zero());
    }
}
