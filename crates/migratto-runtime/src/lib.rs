pub mod db;
pub mod migrations;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use db::{Connector, DbConnection, MigrationConnection, SqlxConnector};
pub use migrations::{
    MigrationFile, MigrationFileSet, MigrationReport, MigrationRunner, MigrationStatus,
};
