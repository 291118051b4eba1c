use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::driver::Driver;
use crate::error::{MigrattoError, Result};

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Driver identifier (`postgres`, `postgresql`, `mysql`, `mariadb`).
    ///
    /// Kept as written so an unsupported value is reported by the runner
    /// rather than rejected while parsing the file.
    pub driver: String,

    /// Server host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port. Defaults to the driver's standard port.
    #[serde(default)]
    pub port: Option<u16>,

    /// Database name.
    pub name: String,

    /// Login user.
    pub user: String,

    /// Login password.
    #[serde(default)]
    pub password: String,

    /// TLS mode, using PostgreSQL's `sslmode` vocabulary.
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
}

impl DatabaseConfig {
    /// Resolve the configured driver identifier.
    pub fn driver(&self) -> Result<Driver> {
        Driver::parse(&self.driver)
    }

    /// Configured port, or the driver's default.
    pub fn port_for(&self, driver: Driver) -> u16 {
        self.port.unwrap_or_else(|| driver.default_port())
    }

    /// Parse the configured TLS mode.
    pub fn ssl_mode(&self) -> Result<SslMode> {
        self.ssl_mode.parse()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: "postgres".to_string(),
            host: default_host(),
            port: None,
            name: String::new(),
            user: String::new(),
            password: String::new(),
            ssl_mode: default_ssl_mode(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_ssl_mode() -> String {
    "disable".to_string()
}

/// TLS negotiation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslMode {
    Disable,
    Allow,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Allow => "allow",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }
}

impl FromStr for SslMode {
    type Err = MigrattoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disable" | "disabled" => Ok(SslMode::Disable),
            "allow" => Ok(SslMode::Allow),
            "prefer" | "preferred" => Ok(SslMode::Prefer),
            "require" | "required" => Ok(SslMode::Require),
            "verify-ca" | "verify_ca" => Ok(SslMode::VerifyCa),
            "verify-full" | "verify_full" | "verify_identity" => Ok(SslMode::VerifyFull),
            other => Err(MigrattoError::Config(format!("Unknown ssl_mode: {}", other))),
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
