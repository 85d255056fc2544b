//! Reading CoinTracking CSV exports.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::domain::{Asset, Decimal, RecordType, Timestamp, TradeRecord};

use super::{DataSourceError, RecordSource};

// Column layout of a CoinTracking export. The header repeats "Cur." for the
// buy, sell, and fee currencies, so rows are read by position. Some exports
// carry an extra LPN column between Date and Tx-ID.
const COL_TYPE: usize = 0;
const COL_BUY: usize = 1;
const COL_BUY_CUR: usize = 2;
const COL_SELL: usize = 3;
const COL_SELL_CUR: usize = 4;
const COL_FEE: usize = 5;
const COL_FEE_CUR: usize = 6;
const COL_EXCHANGE: usize = 7;
const COL_GROUP: usize = 8;
const COL_COMMENT: usize = 9;
const COL_DATE: usize = 10;

/// CSV source for CoinTracking exports, with the config-driven filters the
/// tools need: exchange list, year, and tracked-asset involvement.
#[derive(Debug, Clone)]
pub struct CoinTrackingCsvSource {
    path: PathBuf,
    date_format: String,
    decimal_separator: char,
    exchanges: Vec<String>,
    year: Option<String>,
    asset_filter: Option<Asset>,
}

impl CoinTrackingCsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CoinTrackingCsvSource {
            path: path.into(),
            date_format: crate::domain::timestamp::DEFAULT_DATE_FORMAT.to_string(),
            decimal_separator: '.',
            exchanges: Vec::new(),
            year: None,
            asset_filter: None,
        }
    }

    /// Build a source from the tool config. With `filter_asset` set, rows
    /// not involving the tracked asset on any of the three currency columns
    /// are dropped at import time.
    pub fn from_config(config: &Config, filter_asset: bool) -> Self {
        CoinTrackingCsvSource {
            path: config.import_file.clone(),
            date_format: config.date_format.clone(),
            decimal_separator: config.decimal_separator,
            exchanges: config.ct_exchanges.clone(),
            year: config.ct_year.clone(),
            asset_filter: filter_asset.then(|| config.coin.clone()),
        }
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn with_decimal_separator(mut self, separator: char) -> Self {
        self.decimal_separator = separator;
        self
    }

    pub fn with_exchanges(mut self, exchanges: Vec<String>) -> Self {
        self.exchanges = exchanges;
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_asset_filter(mut self, asset: Asset) -> Self {
        self.asset_filter = Some(asset);
        self
    }

    /// Parse records from any reader; `load` wires this to the configured
    /// file.
    pub fn parse_records<R: std::io::Read>(
        &self,
        reader: R,
    ) -> Result<Vec<TradeRecord>, DataSourceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let path = self.path.display().to_string();
        let tx_id_column = Self::tx_id_column(csv_reader.headers().map_err(|e| {
            DataSourceError::Csv {
                path: path.clone(),
                message: e.to_string(),
            }
        })?);

        let mut records = Vec::new();
        for (index, row) in csv_reader.records().enumerate() {
            // Header is line 1; data rows report 1-based line numbers.
            let row_number = index + 2;
            let row = row.map_err(|e| DataSourceError::Csv {
                path: path.clone(),
                message: e.to_string(),
            })?;

            let record = self.parse_row(&row, row_number, tx_id_column)?;
            if self.accepts(&record) {
                records.push(record);
            }
        }

        tracing::debug!(path = %path, records = records.len(), "parsed CoinTracking export");
        Ok(records)
    }

    /// Exports with an LPN column carry Tx-ID one position later.
    fn tx_id_column(headers: &csv::StringRecord) -> usize {
        if headers.len() > COL_DATE + 2 {
            COL_DATE + 2
        } else {
            COL_DATE + 1
        }
    }

    fn parse_row(
        &self,
        row: &csv::StringRecord,
        row_number: usize,
        tx_id_column: usize,
    ) -> Result<TradeRecord, DataSourceError> {
        let cell = |index: usize| row.get(index).unwrap_or("").trim();

        let date_value = cell(COL_DATE);
        let date = Timestamp::parse(date_value, &self.date_format).map_err(|_| {
            DataSourceError::InvalidDate {
                row: row_number,
                value: date_value.to_string(),
                format: self.date_format.clone(),
            }
        })?;

        let tx_id = cell(tx_id_column);
        Ok(TradeRecord {
            record_type: RecordType::from(cell(COL_TYPE)),
            buy_amount: self.parse_decimal(cell(COL_BUY), "Buy", row_number)?,
            buy_currency: Asset::new(cell(COL_BUY_CUR)),
            sell_amount: self.parse_decimal(cell(COL_SELL), "Sell", row_number)?,
            sell_currency: Asset::new(cell(COL_SELL_CUR)),
            fee_amount: self.parse_decimal(cell(COL_FEE), "Fee", row_number)?,
            fee_currency: Asset::new(cell(COL_FEE_CUR)),
            exchange: cell(COL_EXCHANGE).to_string(),
            group: cell(COL_GROUP).to_string(),
            comment: cell(COL_COMMENT).to_string(),
            date,
            tx_id: (!tx_id.is_empty()).then(|| tx_id.to_string()),
        })
    }

    /// Empty cells are zero. With a `,` separator, `1.234,56` means
    /// thousands-dot / decimal-comma and is normalized before parsing.
    fn parse_decimal(
        &self,
        value: &str,
        column: &'static str,
        row_number: usize,
    ) -> Result<Decimal, DataSourceError> {
        if value.is_empty() {
            return Ok(Decimal::zero());
        }

        let normalized = if self.decimal_separator == ',' {
            value.replace('.', "").replace(',', ".")
        } else {
            value.to_string()
        };

        Decimal::parse(&normalized).map_err(|_| DataSourceError::InvalidDecimal {
            row: row_number,
            column,
            value: value.to_string(),
        })
    }

    fn accepts(&self, record: &TradeRecord) -> bool {
        if !self.exchanges.is_empty() && !self.exchanges.contains(&record.exchange) {
            return false;
        }
        if let Some(year) = &self.year {
            if record.date.format("%Y") != *year {
                return false;
            }
        }
        if let Some(asset) = &self.asset_filter {
            if !(record.trades_asset(asset) || &record.fee_currency == asset) {
                return false;
            }
        }
        true
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CoinTrackingCsvSource {
    fn load(&self) -> Result<Vec<TradeRecord>, DataSourceError> {
        let file = File::open(&self.path).map_err(|e| DataSourceError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;
        self.parse_records(file)
    }
}
