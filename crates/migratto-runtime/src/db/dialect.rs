//! SQL text for the migration history table, per driver family.

use migratto_core::Driver;

/// Name of the history table owned by the engine.
pub const HISTORY_TABLE: &str = "migratto_migration_history";

const POSTGRES_CREATE: &str = r#"
CREATE TABLE IF NOT EXISTS migratto_migration_history (
    id SERIAL PRIMARY KEY,
    filename VARCHAR(255) NOT NULL,
    checksum VARCHAR(64) NOT NULL,
    tag VARCHAR(255) NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const MYSQL_CREATE: &str = r#"
CREATE TABLE IF NOT EXISTS migratto_migration_history (
    id BIGINT PRIMARY KEY AUTO_INCREMENT,
    filename VARCHAR(255) NOT NULL,
    checksum VARCHAR(64) NOT NULL,
    tag VARCHAR(255) NOT NULL,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

// Tables created by older tooling use `TIMESTAMP` for `applied_at`; the cast
// lets both column types decode as UTC.
const POSTGRES_SELECT: &str =
    "SELECT filename, checksum, tag, CAST(applied_at AS TIMESTAMPTZ) AS applied_at \
     FROM migratto_migration_history ORDER BY id ASC";

const MYSQL_SELECT: &str =
    "SELECT filename, checksum, tag, applied_at FROM migratto_migration_history ORDER BY id ASC";

const POSTGRES_INSERT: &str =
    "INSERT INTO migratto_migration_history (filename, checksum, tag) VALUES ($1, $2, $3)";

const MYSQL_INSERT: &str =
    "INSERT INTO migratto_migration_history (filename, checksum, tag) VALUES (?, ?, ?)";

/// Idempotent DDL creating the history table.
pub fn create_history_table(driver: Driver) -> &'static str {
    match driver {
        Driver::Postgres => POSTGRES_CREATE,
        Driver::MySql => MYSQL_CREATE,
    }
}

/// Query returning every history row, oldest first.
///
/// Columns: filename, checksum, tag, applied_at.
pub fn select_history(driver: Driver) -> &'static str {
    match driver {
        Driver::Postgres => POSTGRES_SELECT,
        Driver::MySql => MYSQL_SELECT,
    }
}

/// Parameterized insert taking filename, checksum and tag in that order.
pub fn insert_history(driver: Driver) -> &'static str {
    match driver {
        Driver::Postgres => POSTGRES_INSERT,
        Driver::MySql => MYSQL_INSERT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_is_idempotent_ddl() {
        for driver in [Driver::Postgres, Driver::MySql] {
            let ddl = create_history_table(driver);
            assert!(ddl.contains("CREATE TABLE IF NOT EXISTS migratto_migration_history"));
            assert!(ddl.contains("applied_at"));
        }
    }

    #[test]
    fn test_identity_syntax_per_dialect() {
        assert!(create_history_table(Driver::Postgres).contains("SERIAL PRIMARY KEY"));
        assert!(create_history_table(Driver::MySql).contains("AUTO_INCREMENT"));
    }

    #[test]
    fn test_insert_uses_placeholders() {
        assert!(insert_history(Driver::Postgres).contains("VALUES ($1, $2, $3)"));
        assert!(insert_history(Driver::MySql).contains("VALUES (?, ?, ?)"));
        assert!(!insert_history(Driver::Postgres).contains("applied_at"));
    }

    #[test]
    fn test_select_orders_by_id() {
        for driver in [Driver::Postgres, Driver::MySql] {
            assert!(select_history(driver).ends_with("ORDER BY id ASC"));
            assert!(select_history(driver).contains(HISTORY_TABLE));
        }
    }

    #[test]
    fn test_postgres_select_reads_timestamp_columns_as_utc() {
        let select = select_history(Driver::Postgres);
        assert!(select.contains("CAST(applied_at AS TIMESTAMPTZ) AS applied_at"));
        assert!(select.starts_with("SELECT filename, checksum, tag, "));
    }
}
