use anyhow::Result;
use clap::Parser;
use console::style;

use migratto::{MigrationReport, MigrationRunner, MigrattoConfig, SqlxConnector};

/// Apply all pending migrations.
#[derive(Parser, Debug, Default)]
pub struct UpCommand {}

impl UpCommand {
    pub async fn execute(self, config: MigrattoConfig) -> Result<()> {
        let log = config.log;
        if log {
            print_header(&config);
        }

        let runner = MigrationRunner::new(SqlxConnector, config);
        let report = runner.run().await?;

        if log {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_header(config: &MigrattoConfig) {
    println!();
    println!(
        "  {}  {} Migrations",
        style("⚒️").bold(),
        style("migratto").bold().cyan()
    );
    println!(
        "  {} {} @ {}",
        style("→").dim(),
        style(&config.database.name).bold(),
        config.migrations.dir.display()
    );
    println!();
}

fn print_report(report: &MigrationReport) {
    if report.applied.is_empty() && report.skipped.is_empty() {
        println!("  {} No migrations found", style("ℹ").blue());
        println!();
        return;
    }

    for name in &report.applied {
        println!("  {} Applied: {}", style("✓").green(), style(name).cyan());
    }

    if report.is_noop() {
        println!("  {} Database is up to date", style("✓").green());
    }

    println!();
    println!(
        "  {} {} applied, {} skipped",
        style("ℹ").blue(),
        report.applied_count(),
        report.skipped_count()
    );
    println!();
}
