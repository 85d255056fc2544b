//! CSV report writers.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::domain::{BalanceRecord, Decimal, TradeRecord};
use crate::engine::{OpenLotSnapshot, RealizedMatch};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error writing {path}: {message}")]
    Csv { path: String, message: String },
}

/// Writes the report CSVs.
///
/// Every field is quoted and decimals are written in canonical form, so the
/// files re-import losslessly. A zero amount is written as an empty cell;
/// the importer reads empty cells back as zero.
#[derive(Debug, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        CsvExporter
    }

    pub fn save_matches(
        &self,
        path: &Path,
        matches: &[RealizedMatch],
    ) -> Result<(), ExportError> {
        self.save(path, |w| Self::write_matches(w, matches))
    }

    pub fn save_open_lots(
        &self,
        path: &Path,
        lots: &[OpenLotSnapshot],
    ) -> Result<(), ExportError> {
        self.save(path, |w| Self::write_open_lots(w, lots))
    }

    pub fn save_balances(
        &self,
        path: &Path,
        records: &[BalanceRecord],
    ) -> Result<(), ExportError> {
        self.save(path, |w| Self::write_balances(w, records))
    }

    pub fn save_records(&self, path: &Path, records: &[TradeRecord]) -> Result<(), ExportError> {
        self.save(path, |w| Self::write_records(w, records))
    }

    pub fn write_matches<W: Write>(
        writer: &mut csv::Writer<W>,
        matches: &[RealizedMatch],
    ) -> Result<(), csv::Error> {
        writer.write_record([
            "Coin",
            "Side (Long/Short)",
            "Open Date",
            "Close Date",
            "Amount",
            "Open Price",
            "Close Price",
            "Currency",
            "PnL",
            "Method",
        ])?;
        for m in matches {
            writer.write_record([
                m.asset.to_string(),
                m.side.to_string(),
                m.open_date.to_string(),
                m.close_date.to_string(),
                format_decimal(m.amount),
                format_decimal(m.open_price),
                format_decimal(m.close_price),
                m.currency.to_string(),
                format_decimal(m.pnl),
                m.method.to_string(),
            ])?;
        }
        Ok(())
    }

    pub fn write_open_lots<W: Write>(
        writer: &mut csv::Writer<W>,
        lots: &[OpenLotSnapshot],
    ) -> Result<(), csv::Error> {
        writer.write_record([
            "Coin",
            "Side (Long/Short)",
            "Open Date",
            "Remaining Amount",
            "Open Price",
            "Currency",
            "Total Value at Open",
        ])?;
        for lot in lots {
            writer.write_record([
                lot.asset.to_string(),
                lot.side.to_string(),
                lot.open_date.to_string(),
                format_decimal(lot.remaining),
                format_decimal(lot.open_price),
                lot.currency.to_string(),
                format_decimal(lot.value_at_open),
            ])?;
        }
        Ok(())
    }

    pub fn write_balances<W: Write>(
        writer: &mut csv::Writer<W>,
        records: &[BalanceRecord],
    ) -> Result<(), csv::Error> {
        writer.write_record([
            "Type", "Buy", "Cur.", "Sell", "Cur.", "Fee", "Cur.", "Exchange", "Group", "Comment",
            "Date", "Balance", "BCur",
        ])?;
        for r in records {
            writer.write_record([
                r.record_type.to_string(),
                format_decimal(r.buy_amount),
                r.buy_currency.to_string(),
                format_decimal(r.sell_amount),
                r.sell_currency.to_string(),
                format_decimal(r.fee_amount),
                r.fee_currency.to_string(),
                r.exchange.clone(),
                r.group.clone(),
                r.comment.clone(),
                r.date.to_string(),
                format_decimal(r.balance),
                r.balance_currency.to_string(),
            ])?;
        }
        Ok(())
    }

    pub fn write_records<W: Write>(
        writer: &mut csv::Writer<W>,
        records: &[TradeRecord],
    ) -> Result<(), csv::Error> {
        writer.write_record([
            "Type", "Buy", "Cur.", "Sell", "Cur.", "Fee", "Cur.", "Exchange", "Group", "Comment",
            "Date", "Tx-ID",
        ])?;
        for r in records {
            writer.write_record([
                r.record_type.to_string(),
                format_decimal(r.buy_amount),
                r.buy_currency.to_string(),
                format_decimal(r.sell_amount),
                r.sell_currency.to_string(),
                format_decimal(r.fee_amount),
                r.fee_currency.to_string(),
                r.exchange.clone(),
                r.group.clone(),
                r.comment.clone(),
                r.date.to_string(),
                r.tx_id.clone().unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn save<F>(&self, path: &Path, write: F) -> Result<(), ExportError>
    where
        F: FnOnce(&mut csv::Writer<File>) -> Result<(), csv::Error>,
    {
        let display = path.display().to_string();
        let file = File::create(path).map_err(|e| ExportError::Io {
            path: display.clone(),
            source: e,
        })?;
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(file);

        write(&mut writer).map_err(|e| ExportError::Csv {
            path: display.clone(),
            message: e.to_string(),
        })?;
        writer.flush().map_err(|e| ExportError::Io {
            path: display,
            source: e,
        })
    }
}

/// Canonical cell form of a decimal; zero becomes an empty cell.
fn format_decimal(value: Decimal) -> String {
    if value.is_zero() {
        String::new()
    } else {
        value.to_canonical_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timestamp::DEFAULT_DATE_FORMAT;
    use crate::domain::{AccountingMethod, Asset, PositionSide, Timestamp};

    fn writer() -> csv::Writer<Vec<u8>> {
        csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(Vec::new())
    }

    fn written(writer: csv::Writer<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_matches_csv_shape() {
        let m = RealizedMatch {
            asset: Asset::new("ADA"),
            side: PositionSide::Long,
            open_date: Timestamp::parse("2026-01-01 00:00:00", DEFAULT_DATE_FORMAT).unwrap(),
            close_date: Timestamp::parse("2026-01-02 00:00:00", DEFAULT_DATE_FORMAT).unwrap(),
            amount: Decimal::parse("6").unwrap(),
            open_price: Decimal::parse("1.0").unwrap(),
            close_price: Decimal::parse("1.5").unwrap(),
            currency: Asset::new("USD"),
            pnl: Decimal::parse("3.0").unwrap(),
            method: AccountingMethod::Fifo,
        };

        let mut w = writer();
        CsvExporter::write_matches(&mut w, &[m]).unwrap();
        let out = written(w);

        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"Coin\",\"Side (Long/Short)\",\"Open Date\",\"Close Date\",\"Amount\",\"Open Price\",\"Close Price\",\"Currency\",\"PnL\",\"Method\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"ADA\",\"LONG\",\"2026-01-01 00:00:00\",\"2026-01-02 00:00:00\",\"6\",\"1\",\"1.5\",\"USD\",\"3\",\"FIFO\""
        );
    }

    #[test]
    fn test_open_lots_csv_shape() {
        let lot = OpenLotSnapshot {
            asset: Asset::new("ADA"),
            side: PositionSide::Long,
            open_date: Timestamp::parse("2026-01-01 00:00:00", DEFAULT_DATE_FORMAT).unwrap(),
            remaining: Decimal::parse("4").unwrap(),
            open_price: Decimal::parse("1.0").unwrap(),
            currency: Asset::new("USD"),
            value_at_open: Decimal::parse("4.0").unwrap(),
        };

        let mut w = writer();
        CsvExporter::write_open_lots(&mut w, &[lot]).unwrap();
        let out = written(w);

        assert!(out.contains("\"Remaining Amount\""));
        assert!(out.contains("\"ADA\",\"LONG\",\"2026-01-01 00:00:00\",\"4\",\"1\",\"USD\",\"4\""));
    }

    #[test]
    fn test_zero_decimal_is_empty_cell() {
        assert_eq!(format_decimal(Decimal::zero()), "");
        assert_eq!(format_decimal(Decimal::parse("1.50").unwrap()), "1.5");
    }
}
