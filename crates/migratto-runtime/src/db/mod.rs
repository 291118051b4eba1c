mod connection;
pub mod dialect;

pub use connection::{Connector, DbConnection, MigrationConnection, SqlxConnector};
