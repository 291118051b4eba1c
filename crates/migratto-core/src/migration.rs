use chrono::{DateTime, Utc};
use serde::Serialize;

/// A row of the migration history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    pub filename: String,
    /// Lowercase hex SHA-256 of the file content at apply time.
    pub checksum: String,
    pub tag: String,
    pub applied_at: DateTime<Utc>,
}

/// The caller-supplied part of a history row. `applied_at` is filled in by
/// the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMigrationRecord {
    pub filename: String,
    pub checksum: String,
    pub tag: String,
}

impl NewMigrationRecord {
    pub fn new(
        filename: impl Into<String>,
        checksum: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            checksum: checksum.into(),
            tag: tag.into(),
        }
    }

    /// Complete the record with an application time.
    pub fn applied_at(self, applied_at: DateTime<Utc>) -> MigrationRecord {
        MigrationRecord {
            filename: self.filename,
            checksum: self.checksum,
            tag: self.tag,
            applied_at,
        }
    }
}

/// Where a single migration file stands.
///
/// Every file starts as `Pending`. A run moves it to `Applied` or `Skipped`,
/// or aborts on `Conflicted`. Status reports use `Applied` for any file whose
/// recorded checksum matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    Pending,
    Skipped,
    Applied,
    Conflicted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_completion() {
        let now = Utc::now();
        let record = NewMigrationRecord::new("0001_init.sql", "abc", "0001").applied_at(now);
        assert_eq!(record.filename, "0001_init.sql");
        assert_eq!(record.tag, "0001");
        assert_eq!(record.applied_at, now);
    }
}
