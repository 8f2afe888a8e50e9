//! Platine Dump - logical SQL backup and restore
//!
//! Provides:
//! - Whole-database backups as plain (optionally gzipped) SQL documents
//! - Restores that replay such documents statement by statement
//! - Per-table control over the DROP, CREATE and DATA sections
//! - Pluggable dialect drivers (MySQL/MariaDB built in)
//! - Database and storage backends behind async traits

pub mod database;
pub mod dump;
pub mod helper;
pub mod storage;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
#[cfg(feature = "mysql-backend")]
pub use database::MySqlBackend;
pub use database::{
    DatabaseBackend, DatabaseError, DatabaseResult, DumpConfig, MemoryBackend, QueryResult,
    SchemaInfo,
};
pub use dump::{
    BackupReport, DatabaseDump, DumpDriver, DumpError, DumpMask, DumpResult, MySqlDump,
    NullDumpDriver, ProgressFn, RestoreReport, TableMasks,
};
pub use helper::DatabaseHelper;
pub use storage::{FileSystemStorageBackend, StorageBackend, StorageError};
