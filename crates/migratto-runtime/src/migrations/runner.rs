//! Migration runner.
//!
//! Applies each script in a directory exactly once, in filename order, and
//! refuses to continue when an applied script's content has changed.

use migratto_core::config::MigrattoConfig;
use migratto_core::error::{MigrattoError, Result};
use migratto_core::{Driver, MigrationState, NewMigrationRecord};
use tracing::{debug, info, warn};

use super::checksum;
use super::files::{MigrationFile, MigrationFileSet};
use super::history::{HistorySet, HistoryStore};
use super::report::{MigrationReport, MigrationStatus, StatusEntry};
use crate::db::{Connector, MigrationConnection};

/// Runs the migrations of one configured directory against one database.
pub struct MigrationRunner<K> {
    connector: K,
    config: MigrattoConfig,
}

impl<K: Connector> MigrationRunner<K> {
    pub fn new(connector: K, config: MigrattoConfig) -> Self {
        Self { connector, config }
    }

    /// Apply every pending migration.
    ///
    /// Stops at the first failure. Migrations applied before it stay
    /// committed.
    pub async fn run(&self) -> Result<MigrationReport> {
        if self.config.log {
            info!("Running migrations...");
        }

        let (driver, files) = self.prepare()?;
        let mut conn = self.connector.connect(driver, &self.config.database).await?;

        let result = self.run_inner(&mut conn, driver, &files).await;

        // Always close, even on error
        if let Err(e) = conn.close().await {
            warn!("Failed to close database connection: {}", e);
        }

        if let Ok(report) = &result {
            if self.config.log {
                info!(
                    "Migrations completed successfully: {} applied, {} skipped",
                    report.applied_count(),
                    report.skipped_count()
                );
            }
        }

        result
    }

    /// Classify every migration without executing anything.
    ///
    /// Conflicts are reported in the result rather than raised.
    pub async fn status(&self) -> Result<MigrationStatus> {
        let (driver, files) = self.prepare()?;
        let mut conn = self.connector.connect(driver, &self.config.database).await?;

        let result = self.status_inner(&mut conn, driver, &files).await;

        if let Err(e) = conn.close().await {
            warn!("Failed to close database connection: {}", e);
        }

        result
    }

    /// Validate the driver, then load the directory. Nothing here touches
    /// the database.
    fn prepare(&self) -> Result<(Driver, Vec<MigrationFile>)> {
        let driver = self.config.database.driver()?;
        let files = MigrationFileSet::new(&self.config.migrations.dir).load()?;
        debug!(%driver, count = files.len(), "Prepared migration run");
        Ok((driver, files))
    }

    async fn open_history<C: MigrationConnection>(
        &self,
        conn: &mut C,
        driver: Driver,
    ) -> Result<(HistoryStore, HistorySet)> {
        let store = HistoryStore::new(driver);
        store.ensure_schema(conn).await?;
        let history = store.load_all(conn).await?;
        Ok((store, history))
    }

    async fn run_inner<C: MigrationConnection>(
        &self,
        conn: &mut C,
        driver: Driver,
        files: &[MigrationFile],
    ) -> Result<MigrationReport> {
        let (store, history) = self.open_history(conn, driver).await?;
        let mut report = MigrationReport::default();

        for file in files {
            match classify(file, &history) {
                Classification::New => {
                    self.apply(conn, &store, file).await?;
                    report.record(&file.filename, MigrationState::Applied);
                }
                Classification::Unchanged => {
                    debug!("Skipping already applied migration: {}", file.filename);
                    report.record(&file.filename, MigrationState::Skipped);
                }
                Classification::Changed => {
                    return Err(MigrattoError::Conflict {
                        tag: file.tag.clone(),
                        filename: file.filename.clone(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn status_inner<C: MigrationConnection>(
        &self,
        conn: &mut C,
        driver: Driver,
        files: &[MigrationFile],
    ) -> Result<MigrationStatus> {
        let (_, history) = self.open_history(conn, driver).await?;

        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            entries.push(StatusEntry {
                filename: file.filename.clone(),
                tag: file.tag.clone(),
                state: classify(file, &history).status_state(),
                applied_at: history.get(&file.tag).map(|r| r.applied_at),
            });
        }

        Ok(MigrationStatus { entries })
    }

    async fn apply<C: MigrationConnection>(
        &self,
        conn: &mut C,
        store: &HistoryStore,
        file: &MigrationFile,
    ) -> Result<()> {
        if self.config.log {
            info!("Applying migration: {}", file.filename);
        }

        let sql = file.sql().map_err(|e| MigrattoError::Execution {
            filename: file.filename.clone(),
            source: sqlx::Error::Decode(Box::new(e)),
        })?;

        conn.execute_batch(sql)
            .await
            .map_err(|source| MigrattoError::Execution {
                filename: file.filename.clone(),
                source,
            })?;

        // Record the bytes that ran, not whatever is on disk now.
        let checksum = checksum::of_bytes(&file.content);
        store
            .append(
                conn,
                &NewMigrationRecord::new(&file.filename, checksum, &file.tag),
            )
            .await?;

        debug!("Migration applied: {}", file.filename);
        Ok(())
    }
}

/// How a file relates to the history recorded for its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    /// No record for the tag.
    New,
    /// Recorded with the same checksum.
    Unchanged,
    /// Recorded with a different checksum.
    Changed,
}

impl Classification {
    fn status_state(self) -> MigrationState {
        match self {
            Classification::New => MigrationState::Pending,
            Classification::Unchanged => MigrationState::Applied,
            Classification::Changed => MigrationState::Conflicted,
        }
    }
}

/// Compare the loaded content against the record for its tag.
fn classify(file: &MigrationFile, history: &HistorySet) -> Classification {
    let Some(record) = history.get(&file.tag) else {
        return Classification::New;
    };

    if checksum::of_bytes(&file.content) == record.checksum {
        Classification::Unchanged
    } else {
        Classification::Changed
    }
}
