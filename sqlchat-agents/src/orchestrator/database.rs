use super::OrchestratorError;
use std::path::{Path, PathBuf};

/// One on-disk SQLite database, known to exist when the handle was created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseHandle {
    path: PathBuf,
}

impl DatabaseHandle {
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self, OrchestratorError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(OrchestratorError::DatabaseNotFound {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Connection locator in URI form, e.g. `sqlite:///Chinook.db`
    pub fn locator(&self) -> String {
        format!("sqlite:///{}", self.path.display())
    }

    /// File stem used to name the database in prompts
    pub fn name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("database")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_existing_file() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("Chinook.db");
        std::fs::write(&db_path, b"").unwrap();

        let handle = DatabaseHandle::open_existing(&db_path).unwrap();
        assert_eq!(handle.path(), db_path.as_path());
        assert_eq!(handle.name(), "Chinook");
        assert_eq!(handle.locator(), format!("sqlite:///{}", db_path.display()));
    }

    #[test]
    fn test_relative_locator() {
        let handle = DatabaseHandle {
            path: PathBuf::from("Chinook.db"),
        };
        assert_eq!(handle.locator(), "sqlite:///Chinook.db");
    }

    #[test]
    fn test_missing_file_and_directory_are_not_found() {
        let dir = TempDir::new().unwrap();

        let missing = DatabaseHandle::open_existing(dir.path().join("Chinook.db")).unwrap_err();
        assert!(matches!(missing, OrchestratorError::DatabaseNotFound { .. }));

        let directory = DatabaseHandle::open_existing(dir.path()).unwrap_err();
        assert!(matches!(directory, OrchestratorError::DatabaseNotFound { .. }));
    }
}
