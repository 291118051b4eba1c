use chrono::{DateTime, Utc};
use serde::Serialize;

use migratto_core::MigrationState;

/// Result of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Files executed during this run, in order.
    pub applied: Vec<String>,
    /// Files already applied with matching content.
    pub skipped: Vec<String>,
}

impl MigrationReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Note the outcome of one file. Only `Applied` and `Skipped` are
    /// outcomes of a completed step.
    pub(crate) fn record(&mut self, filename: &str, state: MigrationState) {
        match state {
            MigrationState::Applied => self.applied.push(filename.to_string()),
            MigrationState::Skipped => self.skipped.push(filename.to_string()),
            MigrationState::Pending | MigrationState::Conflicted => {}
        }
    }

    /// Whether the run changed nothing.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// State of one migration file relative to the history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub filename: String,
    pub tag: String,
    /// `Applied` for recorded files with matching content, `Pending` for new
    /// files and `Conflicted` for recorded files whose content changed.
    pub state: MigrationState,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Read-only view of what a run would do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub entries: Vec<StatusEntry>,
}

impl MigrationStatus {
    fn count(&self, state: MigrationState) -> usize {
        self.entries.iter().filter(|e| e.state == state).count()
    }

    pub fn applied_count(&self) -> usize {
        self.count(MigrationState::Applied)
    }

    pub fn pending_count(&self) -> usize {
        self.count(MigrationState::Pending)
    }

    pub fn conflicted_count(&self) -> usize {
        self.count(MigrationState::Conflicted)
    }

    pub fn has_conflicts(&self) -> bool {
        self.conflicted_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(filename: &str, state: MigrationState) -> StatusEntry {
        StatusEntry {
            filename: filename.into(),
            tag: crate::migrations::tag_of(filename).into(),
            state,
            applied_at: None,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = MigrationReport {
            applied: vec!["0002_b.sql".into()],
            skipped: vec!["0001_a.sql".into()],
        };
        assert_eq!(report.applied_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert!(!report.is_noop());
        assert!(MigrationReport::default().is_noop());
    }

    #[test]
    fn test_report_records_outcomes() {
        let mut report = MigrationReport::default();
        report.record("0001_a.sql", MigrationState::Skipped);
        report.record("0002_b.sql", MigrationState::Applied);
        report.record("0003_c.sql", MigrationState::Pending);

        assert_eq!(report.skipped, ["0001_a.sql"]);
        assert_eq!(report.applied, ["0002_b.sql"]);
    }

    #[test]
    fn test_status_counts() {
        let status = MigrationStatus {
            entries: vec![
                entry("0001_a.sql", MigrationState::Applied),
                entry("0002_b.sql", MigrationState::Conflicted),
                entry("0003_c.sql", MigrationState::Pending),
                entry("0004_d.sql", MigrationState::Pending),
            ],
        };
        assert_eq!(status.applied_count(), 1);
        assert_eq!(status.pending_count(), 2);
        assert_eq!(status.conflicted_count(), 1);
        assert!(status.has_conflicts());
    }
}
