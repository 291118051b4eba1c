//! migratto - versioned SQL migrations, applied exactly once.
//!
//! Scripts named `<tag>_<description>.sql` are applied in filename order and
//! recorded with a SHA-256 checksum. A script whose content changes after it
//! was applied stops the next run with a conflict.

pub use migratto_core::{
    DatabaseConfig, Driver, MigrationRecord, MigrationState, MigrationsConfig, MigrattoConfig,
    MigrattoError, Result, SslMode,
};
pub use migratto_runtime::migrations::{
    MigrationFile, MigrationFileSet, MigrationReport, MigrationRunner, MigrationStatus,
    StatusEntry,
};
pub use migratto_runtime::{Connector, SqlxConnector};
