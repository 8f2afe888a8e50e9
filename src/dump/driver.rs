//! Dialect drivers and driver selection
//!
//! A driver produces the SQL text of a backup document for one dialect and
//! replays such documents. `driver_for` maps dialect names to drivers;
//! unknown dialects get the inert `NullDumpDriver`, so backup and restore
//! can be called unconditionally and simply do nothing there.

use async_trait::async_trait;
use tracing::warn;

use super::mask::DumpMask;
use super::mysql::MySqlDump;
use super::{DumpError, DumpResult, ProgressFn};
use crate::database::DatabaseBackend;

/// Dialect-specific backup/restore strategy
#[async_trait(?Send)]
pub trait DumpDriver: Send + Sync {
    /// Prepare the connection and return the document preamble
    ///
    /// # Arguments
    /// * `backend` - Connection to dump
    /// * `database` - Database name
    /// * `tables` - Base tables that will be dumped
    /// * `views` - Views that will be dumped
    async fn start_backup(
        &self,
        backend: &dyn DatabaseBackend,
        database: &str,
        tables: &[String],
        views: &[String],
    ) -> DumpResult<String>;

    /// Release the connection and return the document postamble
    async fn end_backup(&self, backend: &dyn DatabaseBackend, database: &str)
    -> DumpResult<String>;

    /// Return the SQL text for one table or view, honoring `mask`
    async fn dump_table(
        &self,
        backend: &dyn DatabaseBackend,
        name: &str,
        mask: DumpMask,
        is_view: bool,
    ) -> DumpResult<String>;

    /// Replay a (decompressed) backup document against the connection
    ///
    /// # Returns
    /// Number of statements executed
    async fn restore(
        &self,
        backend: &dyn DatabaseBackend,
        filename: &str,
        content: &str,
        on_progress: Option<&mut ProgressFn<'_>>,
        is_compressed: bool,
    ) -> DumpResult<usize>;

    /// Driver name for logs
    fn name(&self) -> &'static str;
}

/// Driver for dialects without dump support: emits and executes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDumpDriver;

#[async_trait(?Send)]
impl DumpDriver for NullDumpDriver {
    async fn start_backup(
        &self,
        _backend: &dyn DatabaseBackend,
        _database: &str,
        _tables: &[String],
        _views: &[String],
    ) -> DumpResult<String> {
        Ok(String::new())
    }

    async fn end_backup(
        &self,
        _backend: &dyn DatabaseBackend,
        _database: &str,
    ) -> DumpResult<String> {
        Ok(String::new())
    }

    async fn dump_table(
        &self,
        _backend: &dyn DatabaseBackend,
        _name: &str,
        _mask: DumpMask,
        _is_view: bool,
    ) -> DumpResult<String> {
        Ok(String::new())
    }

    async fn restore(
        &self,
        _backend: &dyn DatabaseBackend,
        _filename: &str,
        _content: &str,
        _on_progress: Option<&mut ProgressFn<'_>>,
        _is_compressed: bool,
    ) -> DumpResult<usize> {
        Ok(0)
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Dialects with a registered driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// MySQL and MariaDB
    MySql,
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            _ => Err(format!("Unsupported dump dialect: {}", s)),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::MySql => write!(f, "mysql"),
        }
    }
}

impl Dialect {
    /// Instantiate the driver for this dialect
    pub fn driver(self) -> Box<dyn DumpDriver> {
        match self {
            Dialect::MySql => Box::new(MySqlDump::new()),
        }
    }
}

/// Driver for `dialect`, or `UnsupportedDialect`
pub fn try_driver_for(dialect: &str) -> DumpResult<Box<dyn DumpDriver>> {
    dialect
        .parse::<Dialect>()
        .map(Dialect::driver)
        .map_err(|_| DumpError::UnsupportedDialect(dialect.to_string()))
}

/// Driver for `dialect`, falling back to `NullDumpDriver`
pub fn driver_for(dialect: &str) -> Box<dyn DumpDriver> {
    match try_driver_for(dialect) {
        Ok(driver) => driver,
        Err(_) => {
            warn!(
                "No dump driver for dialect '{}'; backup and restore will do nothing",
                dialect
            );
            Box::new(NullDumpDriver)
        }
    }
}
