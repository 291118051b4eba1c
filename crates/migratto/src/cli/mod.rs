mod status;
mod up;

pub use status::StatusCommand;
pub use up::UpCommand;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use console::style;
use tracing::debug;

use migratto::{MigrattoConfig, MigrattoError};

/// Exit status for a migration conflict.
pub const EXIT_CONFLICT: u8 = 2;

/// Exit status for every other failure.
pub const EXIT_FAILURE: u8 = 1;

/// migratto - apply versioned SQL migrations exactly once
#[derive(Parser)]
#[command(name = "migratto")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Apply all pending migrations (default).
    Up(UpCommand),

    /// Show which migrations are applied, pending or conflicted.
    Status(StatusCommand),
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = "migratto.toml", global = true)]
    pub config: String,

    /// Migrations directory path (overrides config).
    #[arg(short, long, global = true)]
    pub migrations_dir: Option<PathBuf>,

    /// Database driver (overrides config).
    #[arg(long, global = true)]
    pub driver: Option<String>,

    /// Disable progress narration.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl GlobalArgs {
    /// Load the configuration file and apply command-line overrides.
    pub fn load_config(&self) -> Result<MigrattoConfig> {
        // Load .env if present
        dotenvy::dotenv().ok();

        let config_path = Path::new(&self.config);
        if !config_path.exists() {
            anyhow::bail!(
                "Configuration file not found: {}\nCreate one with a [database] section or pass --config.",
                self.config
            );
        }

        let mut config = MigrattoConfig::from_file(config_path)?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut MigrattoConfig) {
        if let Some(dir) = &self.migrations_dir {
            config.migrations.dir = dir.clone();
        }
        if let Some(driver) = &self.driver {
            config.database.driver = driver.clone();
        }
        if self.quiet {
            config.log = false;
        }
    }
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        let config = self.global.load_config()?;
        init_tracing(config.log);
        debug!("Loaded configuration from {}", self.global.config);

        match self.command {
            Some(Commands::Up(cmd)) => cmd.execute(config).await,
            Some(Commands::Status(cmd)) => cmd.execute(config).await,
            None => UpCommand::default().execute(config).await,
        }
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over the config's log flag.
fn init_tracing(log: bool) {
    let log_level = if log { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()))
        .with_target(false)
        .init();
}

/// Process exit status for a failed command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<MigrattoError>() {
        Some(e) if e.is_integrity_violation() => EXIT_CONFLICT,
        _ => EXIT_FAILURE,
    }
}

/// Print a failed command's error. Conflicts get their own wording.
pub fn report_error(err: &anyhow::Error) {
    eprintln!();
    match err.downcast_ref::<MigrattoError>() {
        Some(MigrattoError::Conflict { tag, filename }) => {
            eprintln!(
                "  {} {}",
                style("✗").red().bold(),
                style("Migration conflict").red().bold()
            );
            eprintln!(
                "    Migration {} ({}) was modified after it was applied.",
                style(tag).yellow(),
                filename
            );
            eprintln!(
                "    {}",
                style("Restore its original content and add a new migration for the change.").dim()
            );
        }
        _ => {
            eprintln!("  {} {:#}", style("✗").red(), err);
        }
    }
    eprintln!();
}
