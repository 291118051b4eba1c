//! Testing utilities for the migration engine.
//!
//! Enable the `testing` feature to use these from other crates.

mod mock;

pub use mock::{MockConnection, MockConnector, MockFailure};

use std::path::Path;

use migratto_core::config::{DatabaseConfig, MigrattoConfig};

/// Configuration pointing at `dir`, with the given driver identifier.
pub fn test_config(driver: &str, dir: &Path) -> MigrattoConfig {
    let mut config = MigrattoConfig::with_database(DatabaseConfig {
        driver: driver.to_string(),
        name: "migratto_test".to_string(),
        user: "migratto".to_string(),
        ..Default::default()
    });
    config.migrations.dir = dir.to_path_buf();
    config.log = false;
    config
}
