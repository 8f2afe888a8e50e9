//! Local file system storage backend

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{StorageBackend, StorageError};

/// Storage backend on the local file system
///
/// Relative paths are resolved against `base_path`; absolute paths are
/// used as given.
#[derive(Debug, Clone)]
pub struct FileSystemStorageBackend {
    base_path: PathBuf,
}

impl FileSystemStorageBackend {
    /// Create a backend rooted at `base_path`
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Root directory for relative paths
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Absolute location of `path`
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

fn map_io_error(path: &Path, e: std::io::Error) -> StorageError {
    match e.kind() {
        std::io::ErrorKind::NotFound => StorageError::FileNotFound(path.display().to_string()),
        std::io::ErrorKind::PermissionDenied => {
            StorageError::PermissionDenied(path.display().to_string())
        }
        _ => StorageError::IoError(format!("{}: {}", path.display(), e)),
    }
}

#[async_trait(?Send)]
impl StorageBackend for FileSystemStorageBackend {
    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.resolve(path);
        match tokio::fs::metadata(&full).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_io_error(&full, e)),
        }
    }

    async fn is_readable(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.resolve(path);
        match tokio::fs::File::open(&full).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => Ok(false),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_io_error(&full, e)),
        }
    }

    async fn is_writable(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.resolve(path);
        match tokio::fs::metadata(&full).await {
            Ok(meta) => Ok(!meta.permissions().readonly()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(map_io_error(&full, e)),
        }
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full = self.resolve(path);
        tokio::fs::read(&full)
            .await
            .map_err(|e| map_io_error(&full, e))
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| map_io_error(parent, e))?;
        }
        tokio::fs::write(&full, content)
            .await
            .map_err(|e| map_io_error(&full, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let storage = FileSystemStorageBackend::new(dir.path());

        assert!(!storage.file_exists("nested/dump.sql").await.unwrap());
        assert!(storage.is_writable("nested/dump.sql").await.unwrap());
        storage
            .write_file("nested/dump.sql", b"COMMIT;\n")
            .await
            .unwrap();

        assert!(storage.file_exists("nested/dump.sql").await.unwrap());
        assert!(storage.is_readable("nested/dump.sql").await.unwrap());
        assert_eq!(
            storage.read_file("nested/dump.sql").await.unwrap(),
            b"COMMIT;\n"
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let storage = FileSystemStorageBackend::new(dir.path());

        assert!(!storage.is_readable("missing.sql").await.unwrap());
        assert!(matches!(
            storage.read_file("missing.sql").await,
            Err(StorageError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_readonly_file_is_not_writable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locked.sql");
        std::fs::write(&path, "x").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&path, perms).unwrap();

        let storage = FileSystemStorageBackend::new(dir.path());
        assert!(!storage.is_writable("locked.sql").await.unwrap());
    }

    #[test]
    fn test_resolve_absolute_path() {
        let storage = FileSystemStorageBackend::new("/base");
        assert_eq!(storage.resolve("/tmp/a.sql"), PathBuf::from("/tmp/a.sql"));
        assert_eq!(storage.resolve("a.sql"), PathBuf::from("/base/a.sql"));
    }
}
