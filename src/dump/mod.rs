//! Logical backup and restore
//!
//! `DatabaseDump` drives a dialect `DumpDriver` over a `DatabaseBackend`:
//! it introspects the schema, asks the driver for the preamble, one segment
//! per table and per view, and the postamble, optionally gzips the document
//! and writes it through a `StorageBackend`. Restore reads the document back
//! and lets the driver replay it statement by statement.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Instant;
use tracing::{debug, info, warn};

pub mod batch;
pub mod compress;
pub mod driver;
pub mod mask;
pub mod mysql;
pub mod restore;
pub mod types;

pub use driver::{Dialect, DumpDriver, NullDumpDriver, driver_for, try_driver_for};
pub use mask::{DumpMask, TableMasks, parse_mask};
pub use mysql::MySqlDump;

use crate::database::{DatabaseBackend, DatabaseError, SchemaInfo};
use crate::storage::{StorageBackend, StorageError};

/// Error type for backup and restore
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    /// Destination exists and cannot be overwritten
    #[error("Backup file is not writable: {0}")]
    NotWritable(String),

    /// Source file does not exist
    #[error("Backup file not found: {0}")]
    NotFound(String),

    /// Source file exists but cannot be read
    #[error("Backup file is not readable: {0}")]
    NotReadable(String),

    /// Compression requested in a build without gzip support
    #[error("Gzip compression is not available in this build")]
    CompressionUnavailable,

    /// Gzip encode/decode failure
    #[error("Compression error: {0}")]
    Compression(String),

    /// No driver for the connection's dialect (strict mode only)
    #[error("Unsupported dump dialect: {0}")]
    UnsupportedDialect(String),

    /// A replayed statement failed; restore stopped there
    #[error("Error executing SQL [{sql}]: {message}")]
    StatementFailed { sql: String, message: String },

    /// Unparsable dump mask
    #[error("Invalid dump mask: {0}")]
    InvalidMask(String),

    /// Document is not valid UTF-8
    #[error("Backup document is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    /// Database error
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Storage error
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for backup and restore
pub type DumpResult<T> = Result<T, DumpError>;

/// Restore progress callback: executed statement count and percentage
pub type ProgressFn<'a> = dyn FnMut(usize, f64) + Send + 'a;

/// Summary of a finished backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupReport {
    /// File the document was written to
    pub filename: String,
    /// Database name
    pub database: String,
    /// Tables dumped (mask not `NONE`)
    pub tables: usize,
    /// Views dumped (mask not `NONE`)
    pub views: usize,
    /// Bytes written to storage
    pub bytes_written: usize,
    /// Whether the document was gzipped
    pub compressed: bool,
    /// SHA-256 of the written bytes, hex encoded
    pub checksum: String,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Summary of a finished restore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreReport {
    /// File the document was read from
    pub filename: String,
    /// Statements executed
    pub statements: usize,
    /// Whether the document was gunzipped
    pub compressed: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Backup/restore orchestrator
pub struct DatabaseDump<B: DatabaseBackend, S: StorageBackend> {
    backend: B,
    storage: S,
    driver: Box<dyn DumpDriver>,
    tables: TableMasks,
    compress: bool,
    on_progress: Option<Box<ProgressFn<'static>>>,
}

impl<B: DatabaseBackend, S: StorageBackend> DatabaseDump<B, S> {
    /// Create a dump for the backend's dialect
    ///
    /// Dialects without a driver get `NullDumpDriver`: backup writes an
    /// empty document and restore executes nothing.
    pub fn new(backend: B, storage: S) -> Self {
        let driver = driver_for(backend.dialect());
        Self::with_driver(backend, storage, driver)
    }

    /// Create a dump that refuses dialects without a driver
    pub fn strict(backend: B, storage: S) -> DumpResult<Self> {
        let driver = try_driver_for(backend.dialect())?;
        Ok(Self::with_driver(backend, storage, driver))
    }

    /// Create a dump with an explicit driver
    pub fn with_driver(backend: B, storage: S, driver: Box<dyn DumpDriver>) -> Self {
        Self {
            backend,
            storage,
            driver,
            tables: TableMasks::new(),
            compress: false,
            on_progress: None,
        }
    }

    /// Get reference to the database backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get reference to the storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Name of the selected driver
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Per-table masks in effect
    pub fn tables(&self) -> &TableMasks {
        &self.tables
    }

    /// Replace the per-table masks; a missing `*` entry defaults to `ALL`
    pub fn set_tables(&mut self, tables: TableMasks) -> &mut Self {
        self.tables = tables;
        self
    }

    /// Enable or disable gzip compression
    pub fn set_compress(&mut self, compress: bool) -> DumpResult<&mut Self> {
        if compress && !compress::gzip_available() {
            return Err(DumpError::CompressionUnavailable);
        }
        self.compress = compress;
        Ok(self)
    }

    /// Whether documents are gzipped
    pub fn is_compressed(&self) -> bool {
        self.compress
    }

    /// Register or clear the restore progress callback
    pub fn set_on_progress(
        &mut self,
        on_progress: Option<Box<ProgressFn<'static>>>,
    ) -> &mut Self {
        self.on_progress = on_progress;
        self
    }

    /// Dump the whole database to `filename`
    pub async fn backup(&self, filename: &str) -> DumpResult<BackupReport> {
        let start = Instant::now();

        if self.storage.file_exists(filename).await?
            && !self.storage.is_writable(filename).await?
        {
            return Err(DumpError::NotWritable(filename.to_string()));
        }

        let schema = self.backend.schema().await?;
        info!(
            "Backing up database '{}' ({} tables, {} views) with the {} driver",
            schema.database,
            schema.tables.len(),
            schema.views.len(),
            self.driver.name()
        );

        let mut document = self
            .driver
            .start_backup(&self.backend, &schema.database, &schema.tables, &schema.views)
            .await?;

        let (tables, views) = match self.dump_objects(&mut document, &schema).await {
            Ok(counts) => counts,
            Err(e) => {
                let cleanup = self.driver.end_backup(&self.backend, &schema.database).await;
                if let Err(cleanup) = cleanup {
                    warn!("Failed to release tables after backup error: {}", cleanup);
                }
                return Err(e);
            }
        };

        document.push_str(
            &self
                .driver
                .end_backup(&self.backend, &schema.database)
                .await?,
        );

        let bytes = if self.compress {
            compress::compress(document.as_bytes())?
        } else {
            document.into_bytes()
        };

        self.storage.write_file(filename, &bytes).await?;

        let report = BackupReport {
            filename: filename.to_string(),
            database: schema.database,
            tables,
            views,
            bytes_written: bytes.len(),
            compressed: self.compress,
            checksum: hex_digest(&bytes),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Backup written to {} ({} bytes in {}ms)",
            report.filename, report.bytes_written, report.duration_ms
        );
        Ok(report)
    }

    async fn dump_objects(
        &self,
        document: &mut String,
        schema: &SchemaInfo,
    ) -> DumpResult<(usize, usize)> {
        let mut tables = 0;
        for table in &schema.tables {
            if self.dump_object(document, table, false).await? {
                tables += 1;
            }
        }

        let mut views = 0;
        for view in &schema.views {
            if self.dump_object(document, view, true).await? {
                views += 1;
            }
        }
        Ok((tables, views))
    }

    async fn dump_object(
        &self,
        document: &mut String,
        name: &str,
        is_view: bool,
    ) -> DumpResult<bool> {
        let mask = self.tables.mask_for(name);
        if mask.is_empty() {
            debug!("Skipping {} (mask none)", name);
            return Ok(false);
        }
        let kind = if is_view { "view" } else { "table" };
        debug!("Dumping {} {} with mask {}", kind, name, mask);
        let sql = self
            .driver
            .dump_table(&self.backend, name, mask, is_view)
            .await?;
        document.push_str(&sql);
        Ok(true)
    }

    /// Replay the document stored at `filename`
    pub async fn restore(&mut self, filename: &str) -> DumpResult<RestoreReport> {
        let start = Instant::now();

        if !self.storage.file_exists(filename).await? {
            return Err(DumpError::NotFound(filename.to_string()));
        }
        if !self.storage.is_readable(filename).await? {
            return Err(DumpError::NotReadable(filename.to_string()));
        }

        let bytes = self.storage.read_file(filename).await?;
        let bytes = if self.compress {
            compress::decompress(&bytes)?
        } else {
            bytes
        };
        let content =
            String::from_utf8(bytes).map_err(|e| DumpError::InvalidEncoding(e.to_string()))?;

        info!("Restoring {} with the {} driver", filename, self.driver.name());
        let on_progress = self
            .on_progress
            .as_deref_mut()
            .map(|f| f as &mut ProgressFn<'_>);
        let statements = self
            .driver
            .restore(&self.backend, filename, &content, on_progress, self.compress)
            .await?;

        let report = RestoreReport {
            filename: filename.to_string(),
            statements,
            compressed: self.compress,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Restore of {} finished: {} statements in {}ms",
            report.filename, report.statements, report.duration_ms
        );
        Ok(report)
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
