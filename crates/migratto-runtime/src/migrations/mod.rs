pub mod checksum;
mod files;
mod history;
mod report;
mod runner;
mod tag;

pub use files::{MigrationFile, MigrationFileSet, MIGRATION_EXTENSION};
pub use history::{HistorySet, HistoryStore};
pub use report::{MigrationReport, MigrationStatus, StatusEntry};
pub use runner::MigrationRunner;
pub use tag::{tag_of, TAG_SEPARATOR};
