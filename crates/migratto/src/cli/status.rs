use anyhow::Result;
use clap::Parser;
use console::style;

use migratto::{
    MigrationRunner, MigrationState, MigrationStatus, MigrattoConfig, SqlxConnector,
};

/// Show migration status without applying anything.
#[derive(Parser, Debug, Default)]
pub struct StatusCommand {
    /// Print the status as JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub async fn execute(self, config: MigrattoConfig) -> Result<()> {
        let runner = MigrationRunner::new(SqlxConnector, config);
        let status = runner.status().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            print_status(&status);
        }
        Ok(())
    }
}

fn print_status(status: &MigrationStatus) {
    println!();
    println!(
        "  {}  {} Migration Status",
        style("⚒️").bold(),
        style("migratto").bold().cyan()
    );
    println!();

    if status.entries.is_empty() {
        println!("  {} No migrations found", style("ℹ").blue());
        println!();
        return;
    }

    for entry in &status.entries {
        match entry.state {
            MigrationState::Skipped | MigrationState::Applied => {
                let applied_at = entry
                    .applied_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default();
                println!(
                    "  {} {} {} ({})",
                    style("✓").green(),
                    style(&entry.filename).cyan(),
                    style("at").dim(),
                    applied_at
                );
            }
            MigrationState::Pending => {
                println!(
                    "  {} {}",
                    style("○").yellow(),
                    style(&entry.filename).yellow()
                );
            }
            MigrationState::Conflicted => {
                println!(
                    "  {} {} {}",
                    style("✗").red().bold(),
                    style(&entry.filename).red(),
                    style("(modified after apply)").dim()
                );
            }
        }
    }

    println!();
    println!(
        "  {} {} applied, {} pending, {} conflicted",
        style("ℹ").blue(),
        status.applied_count(),
        status.pending_count(),
        status.conflicted_count()
    );
    println!();
}
