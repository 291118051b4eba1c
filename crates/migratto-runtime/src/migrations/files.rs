use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use migratto_core::error::{MigrattoError, Result};

use super::tag::{tag_of, TAG_SEPARATOR};

/// Extension every migration script must carry.
pub const MIGRATION_EXTENSION: &str = ".sql";

/// A migration script read from disk.
#[derive(Debug, Clone)]
pub struct MigrationFile {
    /// Name of the file within the migrations directory.
    pub filename: String,
    /// Logical identifier, the filename prefix before the first `_`.
    pub tag: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// Raw file content.
    pub content: Vec<u8>,
}

impl MigrationFile {
    /// The content as SQL text, if it is valid UTF-8.
    pub fn sql(&self) -> std::result::Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.content)
    }
}

/// The set of migration scripts in a directory.
///
/// Every call to [`MigrationFileSet::load`] reads the directory afresh.
#[derive(Debug, Clone)]
pub struct MigrationFileSet {
    dir: PathBuf,
}

impl MigrationFileSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load every migration script, sorted by filename.
    ///
    /// Subdirectories are ignored. Any other entry that is not a
    /// `<tag>_<name>.sql` file rejects the whole set, as do two files
    /// sharing a tag.
    pub fn load(&self) -> Result<Vec<MigrationFile>> {
        let read_error = |source| MigrattoError::DirectoryRead {
            path: self.dir.clone(),
            source,
        };

        let mut filenames = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }

            let filename = entry
                .file_name()
                .into_string()
                .map_err(|name| MigrattoError::NonSqlFile {
                    filename: name.to_string_lossy().into_owned(),
                })?;
            filenames.push(filename);
        }

        filenames.sort();
        validate_filenames(&filenames)?;

        let mut files = Vec::with_capacity(filenames.len());
        for filename in filenames {
            let path = self.dir.join(&filename);
            let content = std::fs::read(&path).map_err(|source| MigrattoError::FileRead {
                filename: filename.clone(),
                source,
            })?;

            files.push(MigrationFile {
                tag: tag_of(&filename).to_string(),
                filename,
                path,
                content,
            });
        }

        debug!("Loaded {} migration files from {:?}", files.len(), self.dir);
        Ok(files)
    }
}

/// Check naming rules and tag uniqueness over a sorted list of filenames.
fn validate_filenames(filenames: &[String]) -> Result<()> {
    if let Some(filename) = filenames
        .iter()
        .find(|name| !name.ends_with(MIGRATION_EXTENSION))
    {
        return Err(MigrattoError::NonSqlFile {
            filename: filename.clone(),
        });
    }

    if let Some(filename) = filenames
        .iter()
        .find(|name| !name.contains(TAG_SEPARATOR))
    {
        return Err(MigrattoError::InvalidFilename {
            filename: filename.clone(),
        });
    }

    let mut seen: HashMap<&str, &str> = HashMap::new();
    for filename in filenames {
        let tag = tag_of(filename);
        if let Some(first) = seen.insert(tag, filename) {
            return Err(MigrattoError::DuplicateTag {
                tag: tag.to_string(),
                first: first.to_string(),
                second: filename.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn load(dir: &TempDir) -> Result<Vec<MigrationFile>> {
        MigrationFileSet::new(dir.path()).load()
    }

    #[test]
    fn test_load_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir).unwrap().is_empty());
    }

    #[test]
    fn test_load_nonexistent_dir() {
        let err = MigrationFileSet::new("/nonexistent/migratto/path")
            .load()
            .unwrap_err();
        assert!(matches!(err, MigrattoError::DirectoryRead { .. }));
    }

    #[test]
    fn test_load_sorted() {
        let dir = TempDir::new().unwrap();

        fs::write(dir.path().join("0002_second.sql"), "SELECT 2;").unwrap();
        fs::write(dir.path().join("0001_first.sql"), "SELECT 1;").unwrap();
        fs::write(dir.path().join("0003_third.sql"), "SELECT 3;").unwrap();

        let files = load(&dir).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, ["0001_first.sql", "0002_second.sql", "0003_third.sql"]);

        let tags: Vec<_> = files.iter().map(|f| f.tag.as_str()).collect();
        assert_eq!(tags, ["0001", "0002", "0003"]);

        assert_eq!(files[0].sql().unwrap(), "SELECT 1;");
        assert_eq!(files[0].path, dir.path().join("0001_first.sql"));
    }

    #[test]
    fn test_order_is_lexical_not_numeric() {
        let dir = TempDir::new().unwrap();

        fs::write(dir.path().join("10_later.sql"), "").unwrap();
        fs::write(dir.path().join("9_earlier.sql"), "").unwrap();

        let files = load(&dir).unwrap();
        assert_eq!(files[0].filename, "10_later.sql");
        assert_eq!(files[1].filename, "9_earlier.sql");
    }

    #[test]
    fn test_non_sql_file_rejects_whole_set() {
        let dir = TempDir::new().unwrap();

        fs::write(dir.path().join("0001_migration.sql"), "SELECT 1;").unwrap();
        fs::write(dir.path().join("readme.txt"), "Not a migration").unwrap();

        let err = load(&dir).unwrap_err();
        assert!(matches!(err, MigrattoError::NonSqlFile { ref filename } if filename == "readme.txt"));
    }

    #[test]
    fn test_backup_suffix_is_not_sql() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0001_backup.sql.bak"), "SELECT 1;").unwrap();

        assert!(matches!(load(&dir), Err(MigrattoError::NonSqlFile { .. })));
    }

    #[test]
    fn test_missing_separator() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0001_ok.sql"), "SELECT 1;").unwrap();
        fs::write(dir.path().join("init.sql"), "SELECT 1;").unwrap();

        let err = load(&dir).unwrap_err();
        assert!(matches!(err, MigrattoError::InvalidFilename { ref filename } if filename == "init.sql"));
    }

    #[test]
    fn test_duplicate_tag() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0001_users.sql"), "SELECT 1;").unwrap();
        fs::write(dir.path().join("0001_posts.sql"), "SELECT 2;").unwrap();

        match load(&dir).unwrap_err() {
            MigrattoError::DuplicateTag { tag, first, second } => {
                assert_eq!(tag, "0001");
                assert_eq!(first, "0001_posts.sql");
                assert_eq!(second, "0001_users.sql");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_subdirectories_are_ignored() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();
        fs::write(dir.path().join("archive").join("notes.txt"), "old").unwrap();
        fs::write(dir.path().join("0001_init.sql"), "SELECT 1;").unwrap();

        let files = load(&dir).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "0001_init.sql");
    }

    #[test]
    fn test_reload_observes_new_files() {
        let dir = TempDir::new().unwrap();
        let set = MigrationFileSet::new(dir.path());
        fs::write(dir.path().join("0001_init.sql"), "SELECT 1;").unwrap();
        assert_eq!(set.load().unwrap().len(), 1);

        fs::write(dir.path().join("0002_more.sql"), "SELECT 2;").unwrap();
        assert_eq!(set.load().unwrap().len(), 2);
    }
}
