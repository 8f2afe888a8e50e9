//! Database connection abstraction used by the dump engine
//!
//! This module provides the connection-side collaborator of backup/restore:
//! - `DatabaseBackend`: schema introspection, raw execution, queries and quoting
//! - `MemoryBackend`: in-memory MySQL-flavoured backend for tests and dry runs
//! - `MySqlBackend`: live MySQL/MariaDB connection (feature `mysql-backend`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "mysql-backend")]
pub mod mysql;

pub mod config;
pub mod memory;
pub mod quoting;

#[cfg(feature = "mysql-backend")]
pub use self::mysql::MySqlBackend;

pub use config::DumpConfig;
pub use memory::MemoryBackend;

/// Error type for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema introspection failed
    #[error("Introspection failed: {0}")]
    IntrospectionFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Schema objects visible on a connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    /// Name of the current database
    pub database: String,
    /// Base tables, in introspection order
    pub tables: Vec<String>,
    /// Views, in introspection order
    pub views: Vec<String>,
}

impl SchemaInfo {
    /// Create a schema description
    pub fn new(database: impl Into<String>, tables: Vec<String>, views: Vec<String>) -> Self {
        Self {
            database: database.into(),
            tables,
            views,
        }
    }

    /// Tables followed by views
    pub fn objects(&self) -> impl Iterator<Item = &String> {
        self.tables.iter().chain(self.views.iter())
    }
}

/// Query result row as a JSON object keyed by column name
pub type QueryRow = serde_json::Value;

/// Query result set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names, in result order
    pub columns: Vec<String>,
    /// Rows of data
    pub rows: Vec<QueryRow>,
    /// Number of rows affected (for INSERT/UPDATE/DELETE)
    pub rows_affected: Option<u64>,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl QueryResult {
    /// Create a new query result
    pub fn new(columns: Vec<String>, rows: Vec<QueryRow>) -> Self {
        Self {
            columns,
            rows,
            rows_affected: None,
            execution_time_ms: 0,
        }
    }

    /// Create an empty result
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of the column at `index` in the first row
    pub fn first_value(&self, index: usize) -> Option<&serde_json::Value> {
        let column = self.columns.get(index)?;
        self.rows.first()?.get(column)
    }
}

/// Build a row object from column names and values
pub fn row_from_pairs(columns: &[String], values: Vec<serde_json::Value>) -> QueryRow {
    let map: serde_json::Map<String, serde_json::Value> =
        columns.iter().cloned().zip(values).collect();
    serde_json::Value::Object(map)
}

/// Database backend trait for dump and restore operations
///
/// Implementations own exactly one session: table locks taken through
/// `exec` must stay visible to later `execute_query` calls.
#[async_trait(?Send)]
pub trait DatabaseBackend: Send + Sync {
    /// Introspect the current database name, its base tables and its views
    async fn schema(&self) -> DatabaseResult<SchemaInfo>;

    /// Execute a raw SQL statement that returns no rows
    ///
    /// # Returns
    /// Number of rows affected
    async fn exec(&self, sql: &str) -> DatabaseResult<u64>;

    /// Execute a SQL query and return all rows
    async fn execute_query(&self, sql: &str) -> DatabaseResult<QueryResult>;

    /// Execute a SQL query and hand each row to `f` as it arrives
    ///
    /// The default implementation materializes the result first; backends
    /// with a streaming protocol override it.
    async fn for_each_row(
        &self,
        sql: &str,
        f: &mut dyn for<'c, 'r> FnMut(&'c [String], &'r QueryRow) -> DatabaseResult<()>,
    ) -> DatabaseResult<usize> {
        let result = self.execute_query(sql).await?;
        for row in &result.rows {
            f(&result.columns, row)?;
        }
        Ok(result.row_count())
    }

    /// Dialect name used for dump driver selection ("mysql", ...)
    fn dialect(&self) -> &str;

    /// Quote an identifier for this dialect
    fn quote_identifier(&self, name: &str) -> String;

    /// Quote and escape a string literal for this dialect
    fn quote_string(&self, value: &str) -> String;

    /// Check if database is healthy and accessible
    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(true)
    }

    /// Close the database connection
    async fn close(&self) -> DatabaseResult<()> {
        Ok(())
    }
}
