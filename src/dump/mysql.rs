//! MySQL dump driver
//!
//! Produces documents in the classic `mysqldump` layout: a session preamble,
//! then for every table its `DROP`, the server's own `CREATE` text and
//! batched `INSERT` statements wrapped in `DISABLE KEYS`/`ENABLE KEYS`.

use async_trait::async_trait;
use tracing::{debug, info};

use super::batch::{InsertBatch, MAX_SQL_SIZE};
use super::driver::DumpDriver;
use super::mask::DumpMask;
use super::restore::replay;
use super::types::{NumericTypes, numeric_literal};
use super::{DumpResult, ProgressFn};
use crate::database::{DatabaseBackend, DatabaseError, QueryRow};

const SEPARATOR: &str = "-- --------------------------------------------------------\n\n";

/// Backup/restore driver for MySQL and MariaDB
#[derive(Debug, Clone)]
pub struct MySqlDump {
    numeric: NumericTypes,
    max_sql_size: usize,
}

impl MySqlDump {
    /// Create a driver with the default `INSERT` size limit
    pub fn new() -> Self {
        Self {
            numeric: NumericTypes::mysql(),
            max_sql_size: MAX_SQL_SIZE,
        }
    }

    /// Override the `INSERT` size limit
    pub fn with_max_sql_size(mut self, max_sql_size: usize) -> Self {
        self.max_sql_size = max_sql_size;
        self
    }

    /// Override the numeric type table
    pub fn with_numeric_types(mut self, numeric: NumericTypes) -> Self {
        self.numeric = numeric;
        self
    }

    /// Render one column value as a SQL literal
    fn render_value(
        backend: &dyn DatabaseBackend,
        value: Option<&serde_json::Value>,
        numeric: bool,
    ) -> String {
        let value = match value {
            None | Some(serde_json::Value::Null) => return "NULL".to_string(),
            Some(value) => value,
        };

        if numeric && let Some(literal) = numeric_literal(value) {
            return literal;
        }

        match value {
            serde_json::Value::String(s) => backend.quote_string(s),
            other => backend.quote_string(&other.to_string()),
        }
    }

    /// Column names and numeric flags from `SHOW COLUMNS`
    async fn columns(
        &self,
        backend: &dyn DatabaseBackend,
        quoted: &str,
    ) -> DumpResult<Vec<(String, bool)>> {
        let result = backend
            .execute_query(&format!("SHOW COLUMNS FROM {}", quoted))
            .await?;

        result
            .rows
            .iter()
            .map(|row| {
                let field = text_field(row, "Field").ok_or_else(|| {
                    DatabaseError::IntrospectionFailed(format!(
                        "SHOW COLUMNS FROM {} returned a row without Field",
                        quoted
                    ))
                })?;
                let numeric = text_field(row, "Type")
                    .map(|t| self.numeric.is_numeric(&t))
                    .unwrap_or(false);
                Ok((field, numeric))
            })
            .collect()
    }
}

impl Default for MySqlDump {
    fn default() -> Self {
        Self::new()
    }
}

fn text_field(row: &QueryRow, name: &str) -> Option<String> {
    match row.get(name)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait(?Send)]
impl DumpDriver for MySqlDump {
    async fn start_backup(
        &self,
        backend: &dyn DatabaseBackend,
        database: &str,
        tables: &[String],
        views: &[String],
    ) -> DumpResult<String> {
        backend.exec("SET SESSION sql_mode = ''").await?;

        let locks: Vec<String> = tables
            .iter()
            .chain(views.iter())
            .map(|name| format!("{} READ", backend.quote_identifier(name)))
            .collect();
        if !locks.is_empty() {
            backend
                .exec(&format!("LOCK TABLES {}", locks.join(", ")))
                .await?;
        }

        let db = backend.quote_identifier(database);
        let created_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

        Ok(format!(
            "-- Created at {created_at} using platine-dump {version}\n\
             -- Database: {database}\n\
             \n\
             SET NAMES utf8;\n\
             SET SQL_MODE='NO_AUTO_VALUE_ON_ZERO';\n\
             SET FOREIGN_KEY_CHECKS=0;\n\
             SET UNIQUE_CHECKS=0;\n\
             SET AUTOCOMMIT=0;\n\
             \n\
             DROP DATABASE IF EXISTS {db};\n\
             CREATE DATABASE IF NOT EXISTS {db};\n\
             USE {db};\n\
             \n",
            version = env!("CARGO_PKG_VERSION"),
        ))
    }

    async fn end_backup(
        &self,
        backend: &dyn DatabaseBackend,
        _database: &str,
    ) -> DumpResult<String> {
        backend.exec("UNLOCK TABLES").await?;
        Ok("COMMIT;\n-- THE END\n".to_string())
    }

    async fn dump_table(
        &self,
        backend: &dyn DatabaseBackend,
        name: &str,
        mask: DumpMask,
        is_view: bool,
    ) -> DumpResult<String> {
        let quoted = backend.quote_identifier(name);
        let kind = if is_view { "VIEW" } else { "TABLE" };

        let create = backend
            .execute_query(&format!("SHOW CREATE TABLE {}", quoted))
            .await?;
        let ddl = create
            .first_value(1)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                DatabaseError::IntrospectionFailed(format!(
                    "SHOW CREATE TABLE returned no definition for {}",
                    name
                ))
            })?
            .to_string();

        let mut sql = String::from(SEPARATOR);

        if mask.contains(DumpMask::DROP) {
            sql.push_str(&format!("DROP {} IF EXISTS {};\n\n", kind, quoted));
        }

        if mask.contains(DumpMask::CREATE) {
            sql.push_str(&ddl);
            sql.push_str(";\n\n");
        }

        if !is_view && mask.contains(DumpMask::DATA) {
            sql.push_str(&format!("ALTER TABLE {} DISABLE KEYS;\n\n", quoted));

            let columns = self.columns(backend, &quoted).await?;
            let quoted_columns: Vec<String> = columns
                .iter()
                .map(|(column, _)| backend.quote_identifier(column))
                .collect();
            let mut batch = InsertBatch::with_max_size(&quoted, &quoted_columns, self.max_sql_size);

            backend
                .for_each_row(&format!("SELECT * FROM {}", quoted), &mut |_, row| {
                    let values: Vec<String> = columns
                        .iter()
                        .map(|(column, numeric)| {
                            Self::render_value(backend, row.get(column.as_str()), *numeric)
                        })
                        .collect();
                    batch.push_row(&values);
                    Ok(())
                })
                .await?;

            debug!(table = name, rows = batch.rows(), "dumped table data");
            sql.push_str(&batch.finish());
            sql.push_str(&format!("ALTER TABLE {} ENABLE KEYS;\n\n", quoted));
        }

        Ok(sql)
    }

    async fn restore(
        &self,
        backend: &dyn DatabaseBackend,
        filename: &str,
        content: &str,
        on_progress: Option<&mut ProgressFn<'_>>,
        is_compressed: bool,
    ) -> DumpResult<usize> {
        info!(
            "Replaying {} ({}compressed, {} bytes)",
            filename,
            if is_compressed { "" } else { "un" },
            content.len()
        );
        replay(backend, content, on_progress).await
    }

    fn name(&self) -> &'static str {
        "mysql"
    }
}
