use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlSslMode};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{ConnectOptions, Connection, Executor};
use tracing::debug;

use migratto_core::config::{DatabaseConfig, SslMode};
use migratto_core::error::{MigrattoError, Result};
use migratto_core::{Driver, MigrationRecord, NewMigrationRecord};

type HistoryRow = (String, String, String, DateTime<Utc>);

/// A live, exclusively owned database connection.
///
/// The SQL text for history operations is supplied by the caller so the
/// connection stays dialect-agnostic.
pub trait MigrationConnection: Send {
    /// Run a batch of one or more statements.
    fn execute_batch(&mut self, sql: &str) -> impl Future<Output = sqlx::Result<()>> + Send;

    /// Run a history query returning filename, checksum, tag and applied_at.
    fn fetch_history(
        &mut self,
        query: &str,
    ) -> impl Future<Output = sqlx::Result<Vec<MigrationRecord>>> + Send;

    /// Run a history insert, binding filename, checksum and tag in order.
    fn insert_history(
        &mut self,
        statement: &str,
        record: &NewMigrationRecord,
    ) -> impl Future<Output = sqlx::Result<()>> + Send;

    /// Close the connection.
    fn close(self) -> impl Future<Output = sqlx::Result<()>> + Send;
}

/// Produces connections from database configuration.
pub trait Connector: Send + Sync {
    type Connection: MigrationConnection;

    /// Open a connection for an already-validated driver.
    fn connect(
        &self,
        driver: Driver,
        config: &DatabaseConfig,
    ) -> impl Future<Output = Result<Self::Connection>> + Send;
}

/// Connector backed by sqlx's native drivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxConnector;

impl Connector for SqlxConnector {
    type Connection = DbConnection;

    async fn connect(&self, driver: Driver, config: &DatabaseConfig) -> Result<DbConnection> {
        let ssl_mode = config.ssl_mode()?;
        let port = config.port_for(driver);
        debug!(%driver, host = %config.host, port, database = %config.name, "Connecting");

        match driver {
            Driver::Postgres => {
                let options = PgConnectOptions::new()
                    .host(&config.host)
                    .port(port)
                    .database(&config.name)
                    .username(&config.user)
                    .password(&config.password)
                    .ssl_mode(pg_ssl_mode(ssl_mode))
                    .disable_statement_logging();

                let conn = PgConnection::connect_with(&options)
                    .await
                    .map_err(MigrattoError::Connect)?;
                Ok(DbConnection::Postgres(conn))
            }
            Driver::MySql => {
                let options = MySqlConnectOptions::new()
                    .host(&config.host)
                    .port(port)
                    .database(&config.name)
                    .username(&config.user)
                    .password(&config.password)
                    .ssl_mode(mysql_ssl_mode(ssl_mode))
                    .disable_statement_logging();

                let conn = MySqlConnection::connect_with(&options)
                    .await
                    .map_err(MigrattoError::Connect)?;
                Ok(DbConnection::MySql(conn))
            }
        }
    }
}

fn pg_ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Allow => PgSslMode::Allow,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

fn mysql_ssl_mode(mode: SslMode) -> MySqlSslMode {
    match mode {
        SslMode::Disable => MySqlSslMode::Disabled,
        SslMode::Allow | SslMode::Prefer => MySqlSslMode::Preferred,
        SslMode::Require => MySqlSslMode::Required,
        SslMode::VerifyCa => MySqlSslMode::VerifyCa,
        SslMode::VerifyFull => MySqlSslMode::VerifyIdentity,
    }
}

/// A connection to one of the supported driver families.
#[derive(Debug)]
pub enum DbConnection {
    Postgres(PgConnection),
    MySql(MySqlConnection),
}

fn into_records(rows: Vec<HistoryRow>) -> Vec<MigrationRecord> {
    rows.into_iter()
        .map(|(filename, checksum, tag, applied_at)| MigrationRecord {
            filename,
            checksum,
            tag,
            applied_at,
        })
        .collect()
}

impl MigrationConnection for DbConnection {
    // Unbound text goes through the simple query protocol, which accepts
    // several statements in one batch.
    async fn execute_batch(&mut self, sql: &str) -> sqlx::Result<()> {
        match self {
            DbConnection::Postgres(conn) => {
                conn.execute(sql).await?;
            }
            DbConnection::MySql(conn) => {
                conn.execute(sql).await?;
            }
        }
        Ok(())
    }

    async fn fetch_history(&mut self, query: &str) -> sqlx::Result<Vec<MigrationRecord>> {
        let rows: Vec<HistoryRow> = match self {
            DbConnection::Postgres(conn) => sqlx::query_as(query).fetch_all(&mut *conn).await?,
            DbConnection::MySql(conn) => sqlx::query_as(query).fetch_all(&mut *conn).await?,
        };
        Ok(into_records(rows))
    }

    async fn insert_history(
        &mut self,
        statement: &str,
        record: &NewMigrationRecord,
    ) -> sqlx::Result<()> {
        match self {
            DbConnection::Postgres(conn) => {
                sqlx::query(statement)
                    .bind(&record.filename)
                    .bind(&record.checksum)
                    .bind(&record.tag)
                    .execute(&mut *conn)
                    .await?;
            }
            DbConnection::MySql(conn) => {
                sqlx::query(statement)
                    .bind(&record.filename)
                    .bind(&record.checksum)
                    .bind(&record.tag)
                    .execute(&mut *conn)
                    .await?;
            }
        }
        Ok(())
    }

    async fn close(self) -> sqlx::Result<()> {
        match self {
            DbConnection::Postgres(conn) => conn.close().await,
            DbConnection::MySql(conn) => conn.close().await,
        }
    }
}
