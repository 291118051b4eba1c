use std::path::PathBuf;

use thiserror::Error;

/// Core error type for migratto operations.
///
/// Every variant is fatal to the run that produced it.
#[derive(Error, Debug)]
pub enum MigrattoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported database driver: {0}")]
    UnsupportedDriver(String),

    #[error("Failed to read migrations directory {}: {source}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The migrations directory must contain only .sql files, found: {filename}")]
    NonSqlFile { filename: String },

    #[error("Migration filename has no `_`-delimited tag prefix: {filename}")]
    InvalidFilename { filename: String },

    #[error("Duplicate migration tag {tag} in files {first} and {second}")]
    DuplicateTag {
        tag: String,
        first: String,
        second: String,
    },

    #[error("Failed to read migration file {filename}: {source}")]
    FileRead {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to compute checksum of {}: {source}", path.display())]
    Checksum {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Failed to create migration history table: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("Failed to query applied migrations: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Failed to execute migration file {filename}: {source}")]
    Execution {
        filename: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Migration conflict for tag {tag} in file {filename}: content changed since it was applied")]
    Conflict { tag: String, filename: String },

    #[error("Migration file {filename} was executed but recording it in history failed: {source}")]
    HistoryWrite {
        filename: String,
        #[source]
        source: sqlx::Error,
    },
}

impl MigrattoError {
    /// Whether the error signals drift in already-applied data rather than
    /// an infrastructure fault.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, MigrattoError::Conflict { .. })
    }

}

/// Result type alias using MigrattoError.
pub type Result<T> = std::result::Result<T, MigrattoError>;
