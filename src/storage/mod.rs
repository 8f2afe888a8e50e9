//! Storage backends for backup documents
//!
//! The dump engine reads and writes whole files through `StorageBackend`,
//! so documents can live on the local disk or anywhere else a backend
//! can reach.

use async_trait::async_trait;

pub mod filesystem;

pub use filesystem::FileSystemStorageBackend;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// File does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Whole-file storage used by backup and restore
#[async_trait(?Send)]
pub trait StorageBackend: Send + Sync {
    /// Check whether a file exists
    async fn file_exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Check whether an existing file can be read
    async fn is_readable(&self, path: &str) -> Result<bool, StorageError>;

    /// Check whether an existing file can be overwritten
    async fn is_writable(&self, path: &str) -> Result<bool, StorageError>;

    /// Read a whole file
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Create or replace a whole file
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;
}
