//! Tool orchestrators: import, compute, export.
//!
//! Each tool wires a record source, one engine, and the exporter for a
//! single batch run driven by a config file.

use std::path::Path;

use crate::aggregate::DayAggregator;
use crate::config::{Config, ConfigError};
use crate::datasource::{CoinTrackingCsvSource, RecordSource};
use crate::engine::{BalanceCalculator, MatchingEngine};
use crate::error::AppError;
use crate::export::CsvExporter;

/// Realized-PnL tool: match trades into lots, export matches and open lots.
pub struct PnlTool {
    config: Config,
    source: Box<dyn RecordSource>,
}

impl PnlTool {
    pub fn new(config: Config) -> Self {
        let source = Box::new(CoinTrackingCsvSource::from_config(&config, true));
        Self::with_source(config, source)
    }

    pub fn with_source(config: Config, source: Box<dyn RecordSource>) -> Self {
        PnlTool { config, source }
    }

    pub fn run(&self) -> Result<(), AppError> {
        // Fail on a missing method before touching the import file.
        let method = self.config.require_accounting_method()?;
        let pnl_path = require_path(self.config.export_pnl_file.as_deref(), "export_pnl_file")?;
        let lots_path = require_path(
            self.config.export_open_lots_file.as_deref(),
            "export_open_lots_file",
        )?;

        let records = self.source.load()?;
        tracing::info!(records = records.len(), "imported records");

        let engine = MatchingEngine::new(self.config.coin.clone(), method);
        let (matches, open_lots) = engine.calculate(records)?;

        let exporter = CsvExporter::new();
        exporter.save_matches(pnl_path, &matches)?;
        exporter.save_open_lots(lots_path, &open_lots)?;
        tracing::info!(
            matches = matches.len(),
            open_lots = open_lots.len(),
            "pnl reports written"
        );
        Ok(())
    }
}

/// Balance tool: annotate records with the running balance of the coin.
pub struct BalanceTool {
    config: Config,
    source: Box<dyn RecordSource>,
}

impl BalanceTool {
    pub fn new(config: Config) -> Self {
        let source = Box::new(CoinTrackingCsvSource::from_config(&config, true));
        Self::with_source(config, source)
    }

    pub fn with_source(config: Config, source: Box<dyn RecordSource>) -> Self {
        BalanceTool { config, source }
    }

    pub fn run(&self) -> Result<(), AppError> {
        let export_path = require_path(self.config.export_file.as_deref(), "export_file")?;

        let mut records = self.source.load()?;
        // The running balance is only meaningful in time order.
        records.sort_by(|a, b| a.date.cmp(&b.date));
        tracing::info!(records = records.len(), "imported records");

        let calculator = BalanceCalculator::new(self.config.coin.clone());
        let balances = calculator.track_balance(&records);

        CsvExporter::new().save_balances(export_path, &balances)?;
        tracing::info!(records = balances.len(), "balance report written");
        Ok(())
    }
}

/// Aggregation tool: collapse per-day record runs into daily entries.
pub struct AggregateTool {
    config: Config,
    source: Box<dyn RecordSource>,
}

impl AggregateTool {
    pub fn new(config: Config) -> Self {
        let source = Box::new(CoinTrackingCsvSource::from_config(&config, false));
        Self::with_source(config, source)
    }

    pub fn with_source(config: Config, source: Box<dyn RecordSource>) -> Self {
        AggregateTool { config, source }
    }

    pub fn run(&self) -> Result<(), AppError> {
        let export_path = require_path(self.config.export_file.as_deref(), "export_file")?;

        let records = self.source.load()?;
        tracing::info!(records = records.len(), "imported records");

        let aggregated = DayAggregator::new().aggregate(records);

        CsvExporter::new().save_records(export_path, &aggregated)?;
        tracing::info!(records = aggregated.len(), "aggregated export written");
        Ok(())
    }
}

fn require_path<'a>(
    path: Option<&'a Path>,
    key: &'static str,
) -> Result<&'a Path, ConfigError> {
    path.ok_or(ConfigError::MissingValue(key))
}
