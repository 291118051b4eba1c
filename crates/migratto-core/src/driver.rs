use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MigrattoError;

/// Database driver families supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// PostgreSQL and compatible servers.
    Postgres,
    /// MySQL and MariaDB.
    MySql,
}

impl Driver {
    /// Resolve a driver identifier. Matching is case-insensitive.
    pub fn parse(identifier: &str) -> Result<Self, MigrattoError> {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Driver::Postgres),
            "mysql" | "mariadb" => Ok(Driver::MySql),
            _ => Err(MigrattoError::UnsupportedDriver(identifier.to_string())),
        }
    }

    /// Default server port for the driver family.
    pub fn default_port(&self) -> u16 {
        match self {
            Driver::Postgres => 5432,
            Driver::MySql => 3306,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Postgres => "postgres",
            Driver::MySql => "mysql",
        }
    }
}

impl FromStr for Driver {
    type Err = MigrattoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
