mod database;

pub use database::{DatabaseConfig, SslMode};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MigrattoError, Result};

/// Root configuration for migratto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrattoConfig {
    /// Database configuration.
    pub database: DatabaseConfig,

    /// Migration source configuration.
    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Narrate progress while running. Has no effect on control flow.
    #[serde(default = "default_log")]
    pub log: bool,
}

impl MigrattoConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MigrattoError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content)?;

        toml::from_str(&content)
            .map_err(|e| MigrattoError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Build a configuration around a database config with defaults elsewhere.
    pub fn with_database(database: DatabaseConfig) -> Self {
        Self {
            database,
            migrations: MigrationsConfig::default(),
            log: default_log(),
        }
    }
}

fn default_log() -> bool {
    true
}

/// Where migration scripts are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationsConfig {
    /// Directory holding `<tag>_<name>.sql` files.
    #[serde(default = "default_migrations_dir")]
    pub dir: PathBuf,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            dir: default_migrations_dir(),
        }
    }
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("./migrations")
}

/// Substitute environment variables in the format ${VAR_NAME}.
///
/// Unset variables are left as written.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| MigrattoError::Config(format!("Invalid substitution pattern: {}", e)))?;

    let mut result = content.to_string();
    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    Ok(result)
}
