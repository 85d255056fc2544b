//! In-memory record source for tests.

use crate::domain::TradeRecord;

use super::{DataSourceError, RecordSource};

/// Record source returning predefined records, no filesystem involved.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    records: Vec<TradeRecord>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, record: TradeRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_records(mut self, records: Vec<TradeRecord>) -> Self {
        self.records.extend(records);
        self
    }
}

impl RecordSource for MockSource {
    fn load(&self) -> Result<Vec<TradeRecord>, DataSourceError> {
        Ok(self.records.clone())
    }
}
