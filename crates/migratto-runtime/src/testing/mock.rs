//! In-memory connector for exercising the engine without a database.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use migratto_core::config::DatabaseConfig;
use migratto_core::error::{MigrattoError, Result};
use migratto_core::{Driver, MigrationRecord, NewMigrationRecord};

use crate::db::dialect::HISTORY_TABLE;
use crate::db::{Connector, MigrationConnection};

/// An operation the mock should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Opening a connection.
    Connect,
    /// Creating the history table.
    Schema,
    /// Reading the history table.
    Query,
    /// Executing any script containing the given text.
    Execute(String),
    /// Inserting a history record.
    Insert,
}

#[derive(Debug, Default)]
struct MockState {
    records: Vec<MigrationRecord>,
    scripts: Vec<String>,
    statements: Vec<String>,
    connects: usize,
    closes: usize,
}

/// Mock connector with a shared in-memory history table.
///
/// Clones share state, so a connector can be handed to a runner and
/// inspected afterwards.
///
/// # Example
///
/// ```ignore
/// let connector = MockConnector::new().fail_on(MockFailure::Execute("DROP".into()));
/// let runner = MigrationRunner::new(connector.clone(), config);
/// runner.run().await.unwrap_err();
/// assert_eq!(connector.close_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    failures: Vec<MockFailure>,
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the history table.
    pub fn with_records(self, records: impl IntoIterator<Item = MigrationRecord>) -> Self {
        self.lock().records.extend(records);
        self
    }

    /// Make an operation fail on every connection from this connector.
    pub fn fail_on(mut self, failure: MockFailure) -> Self {
        self.failures.push(failure);
        self
    }

    /// A connection sharing this connector's state, without counting a connect.
    pub fn connection(&self) -> MockConnection {
        MockConnection {
            failures: self.failures.clone(),
            state: Arc::clone(&self.state),
        }
    }

    /// History rows in insertion order.
    pub fn records(&self) -> Vec<MigrationRecord> {
        self.lock().records.clone()
    }

    /// Migration scripts executed, in order. Excludes history table statements.
    pub fn executed(&self) -> Vec<String> {
        self.lock().scripts.clone()
    }

    /// Every statement seen, in order.
    pub fn statements(&self) -> Vec<String> {
        self.lock().statements.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.lock().connects
    }

    pub fn close_count(&self) -> usize {
        self.lock().closes
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Connector for MockConnector {
    type Connection = MockConnection;

    async fn connect(&self, _driver: Driver, _config: &DatabaseConfig) -> Result<MockConnection> {
        self.lock().connects += 1;
        if self.failures.contains(&MockFailure::Connect) {
            return Err(MigrattoError::Connect(mock_error("connection refused")));
        }
        Ok(self.connection())
    }
}

/// Connection handed out by [`MockConnector`].
#[derive(Debug)]
pub struct MockConnection {
    failures: Vec<MockFailure>,
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fails(&self, failure: &MockFailure) -> bool {
        self.failures.contains(failure)
    }

    fn fails_script(&self, sql: &str) -> bool {
        self.failures.iter().any(|f| match f {
            MockFailure::Execute(needle) => sql.contains(needle.as_str()),
            _ => false,
        })
    }
}

fn mock_error(message: &str) -> sqlx::Error {
    sqlx::Error::Protocol(format!("mock: {}", message))
}

impl MigrationConnection for MockConnection {
    async fn execute_batch(&mut self, sql: &str) -> sqlx::Result<()> {
        self.lock().statements.push(sql.to_string());

        if sql.contains(HISTORY_TABLE) {
            if self.fails(&MockFailure::Schema) {
                return Err(mock_error("cannot create history table"));
            }
            return Ok(());
        }

        if self.fails_script(sql) {
            return Err(mock_error("syntax error"));
        }
        self.lock().scripts.push(sql.to_string());
        Ok(())
    }

    async fn fetch_history(&mut self, query: &str) -> sqlx::Result<Vec<MigrationRecord>> {
        let mut state = self.lock();
        state.statements.push(query.to_string());
        if self.fails(&MockFailure::Query) {
            return Err(mock_error("relation does not exist"));
        }
        Ok(state.records.clone())
    }

    async fn insert_history(
        &mut self,
        statement: &str,
        record: &NewMigrationRecord,
    ) -> sqlx::Result<()> {
        let mut state = self.lock();
        state.statements.push(statement.to_string());
        if self.fails(&MockFailure::Insert) {
            return Err(mock_error("disk full"));
        }
        state.records.push(record.clone().applied_at(Utc::now()));
        Ok(())
    }

    async fn close(self) -> sqlx::Result<()> {
        self.lock().closes += 1;
        Ok(())
    }
}
