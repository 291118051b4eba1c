pub mod config;
pub mod driver;
pub mod error;
pub mod migration;

pub use config::{DatabaseConfig, MigrationsConfig, MigrattoConfig, SslMode};
pub use driver::Driver;
pub use error::{MigrattoError, Result};
pub use migration::{MigrationRecord, MigrationState, NewMigrationRecord};
