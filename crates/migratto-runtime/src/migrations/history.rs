//! Persisted record of applied migrations.

use std::collections::HashMap;

use tracing::debug;

use migratto_core::error::{MigrattoError, Result};
use migratto_core::{Driver, MigrationRecord, NewMigrationRecord};

use crate::db::{dialect, MigrationConnection};

/// Applied migrations keyed by tag.
#[derive(Debug, Clone, Default)]
pub struct HistorySet {
    by_tag: HashMap<String, MigrationRecord>,
}

impl HistorySet {
    /// Build from records in insertion order. The first record for a tag wins.
    pub fn from_records(records: impl IntoIterator<Item = MigrationRecord>) -> Self {
        let mut by_tag = HashMap::new();
        for record in records {
            by_tag.entry(record.tag.clone()).or_insert(record);
        }
        Self { by_tag }
    }

    pub fn get(&self, tag: &str) -> Option<&MigrationRecord> {
        self.by_tag.get(tag)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_tag.len()
    }
}

/// History table operations for one driver dialect.
#[derive(Debug, Clone, Copy)]
pub struct HistoryStore {
    driver: Driver,
}

impl HistoryStore {
    pub fn new(driver: Driver) -> Self {
        Self { driver }
    }

    /// Create the history table if it does not exist.
    pub async fn ensure_schema<C: MigrationConnection>(&self, conn: &mut C) -> Result<()> {
        conn.execute_batch(dialect::create_history_table(self.driver))
            .await
            .map_err(MigrattoError::Schema)?;
        debug!("History table {} ready", dialect::HISTORY_TABLE);
        Ok(())
    }

    /// Read every applied migration.
    pub async fn load_all<C: MigrationConnection>(&self, conn: &mut C) -> Result<HistorySet> {
        let records = conn
            .fetch_history(dialect::select_history(self.driver))
            .await
            .map_err(MigrattoError::Query)?;

        let history = HistorySet::from_records(records);
        debug!("Loaded {} applied migrations", history.len());
        Ok(history)
    }

    /// Append one record. `applied_at` is set by the database.
    pub async fn append<C: MigrationConnection>(
        &self,
        conn: &mut C,
        record: &NewMigrationRecord,
    ) -> Result<()> {
        conn.insert_history(dialect::insert_history(self.driver), record)
            .await
            .map_err(|source| MigrattoError::HistoryWrite {
                filename: record.filename.clone(),
                source,
            })
    }
}
