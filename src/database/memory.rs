//! In-memory MySQL-flavoured database backend
//!
//! Understands just enough of MySQL to take part in a backup/restore cycle:
//! it answers the introspection queries the dump driver issues and applies
//! the DDL and `INSERT` statements a backup document contains. Every other
//! statement is accepted and recorded without effect.
//!
//! Useful for tests and for dry runs of a backup document.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::ast::{
    Expr, ObjectName, ObjectType, SetExpr, Statement, TableObject, UnaryOperator, Value,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

use super::quoting::{quote_identifier_mysql, quote_string_mysql, unquote_identifier_mysql};
use super::{
    DatabaseBackend, DatabaseError, DatabaseResult, QueryResult, SchemaInfo, row_from_pairs,
};

const IDENT: &str = r"(`(?:[^`]|``)+`|[A-Za-z0-9_$]+)";

static CREATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*CREATE\s+(?:TEMPORARY\s+)?TABLE\b")
        .expect("create table pattern is valid")
});

static CREATE_VIEW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^\s*CREATE\s+(OR\s+REPLACE\s+)?(?:ALGORITHM\s*=\s*\w+\s+)?(?:DEFINER\s*=\s*\S+\s+)?(?:SQL\s+SECURITY\s+\w+\s+)?VIEW\s+{IDENT}"
    ))
    .expect("create view pattern is valid")
});

static DROP_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*DROP\s+(?:TEMPORARY\s+)?(?:TABLE|VIEW)\b")
        .expect("drop pattern is valid")
});

static DROP_DATABASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*DROP\s+(?:DATABASE|SCHEMA)\b").expect("drop database pattern is valid")
});

static USE_DATABASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?is)^\s*USE\s+{IDENT}")).expect("use pattern is valid")
});

static INSERT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^\s*INSERT\s+").expect("insert pattern is valid"));

static SHOW_CREATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?is)^\s*SHOW\s+CREATE\s+(?:TABLE|VIEW)\s+{IDENT}\s*$"))
        .expect("show create pattern is valid")
});

static SHOW_COLUMNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^\s*SHOW\s+(?:FULL\s+)?(?:COLUMNS|FIELDS)\s+FROM\s+{IDENT}\s*$"
    ))
    .expect("show columns pattern is valid")
});

static SELECT_ALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?is)^\s*SELECT\s+\*\s+FROM\s+{IDENT}\s*$"))
        .expect("select pattern is valid")
});

static SELECT_DATABASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*SELECT\s+DATABASE\s*\(\s*\)\s*$").expect("database pattern is valid")
});

static SHOW_TABLES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*SHOW\s+(FULL\s+)?TABLES\s*$").expect("show tables pattern is valid")
});

#[derive(Debug, Clone)]
struct MemoryColumn {
    name: String,
    sql_type: String,
}

#[derive(Debug, Clone)]
struct MemoryTable {
    name: String,
    ddl: String,
    columns: Vec<MemoryColumn>,
    rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone)]
struct MemoryView {
    name: String,
    ddl: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    database: String,
    tables: Vec<MemoryTable>,
    views: Vec<MemoryView>,
    executed: Vec<String>,
    fail_patterns: Vec<String>,
}

impl MemoryState {
    fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    fn table_mut(&mut self, name: &str) -> Option<&mut MemoryTable> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    fn view(&self, name: &str) -> Option<&MemoryView> {
        self.views.iter().find(|v| v.name == name)
    }

    fn object_exists(&self, name: &str) -> bool {
        self.table(name).is_some() || self.view(name).is_some()
    }

    fn check_failure(&self, sql: &str) -> DatabaseResult<()> {
        match self.fail_patterns.iter().find(|p| sql.contains(p.as_str())) {
            Some(pattern) => Err(DatabaseError::QueryFailed(format!(
                "Statement matches failure pattern '{}'",
                pattern
            ))),
            None => Ok(()),
        }
    }

    fn create_table(&mut self, sql: &str) -> DatabaseResult<u64> {
        let create = match parse_statement(sql)? {
            Statement::CreateTable(create) => create,
            _ => {
                return Err(DatabaseError::InvalidInput(format!(
                    "Not a CREATE TABLE statement: {}",
                    sql
                )));
            }
        };
        let name = object_name(&create.name);

        if self.object_exists(&name) {
            if create.if_not_exists {
                return Ok(0);
            }
            return Err(DatabaseError::QueryFailed(format!(
                "Table '{}' already exists",
                name
            )));
        }

        // SHOW COLUMNS reports types in lower case
        let columns = create
            .columns
            .iter()
            .map(|column| MemoryColumn {
                name: column.name.value.clone(),
                sql_type: column.data_type.to_string().to_lowercase(),
            })
            .collect::<Vec<_>>();
        if columns.is_empty() {
            return Err(DatabaseError::InvalidInput(format!(
                "Table {} has no columns",
                name
            )));
        }

        self.tables.push(MemoryTable {
            name,
            ddl: sql.trim().to_string(),
            columns,
            rows: Vec::new(),
        });
        Ok(0)
    }

    fn create_view(&mut self, sql: &str) -> DatabaseResult<u64> {
        let caps = CREATE_VIEW.captures(sql).ok_or_else(|| {
            DatabaseError::InvalidInput(format!("Not a CREATE VIEW statement: {}", sql))
        })?;
        let or_replace = caps.get(1).is_some();
        let name = unquote_identifier_mysql(&caps[2]);

        if self.table(&name).is_some() || (self.view(&name).is_some() && !or_replace) {
            return Err(DatabaseError::QueryFailed(format!(
                "Table '{}' already exists",
                name
            )));
        }

        self.views.retain(|v| v.name != name);
        self.views.push(MemoryView {
            name,
            ddl: sql.trim().to_string(),
        });
        Ok(0)
    }

    fn drop_objects(&mut self, sql: &str) -> DatabaseResult<u64> {
        let (object_type, if_exists, names) = match parse_statement(sql)? {
            Statement::Drop {
                object_type,
                if_exists,
                names,
                ..
            } => (object_type, if_exists, names),
            _ => {
                return Err(DatabaseError::InvalidInput(format!(
                    "Not a DROP statement: {}",
                    sql
                )));
            }
        };
        let is_view = object_type == ObjectType::View;

        for name in names.iter().map(object_name) {
            let before = self.tables.len() + self.views.len();
            if is_view {
                self.views.retain(|v| v.name != name);
            } else {
                self.tables.retain(|t| t.name != name);
            }
            if before == self.tables.len() + self.views.len() && !if_exists {
                return Err(DatabaseError::QueryFailed(format!(
                    "Unknown {} '{}'",
                    if is_view { "view" } else { "table" },
                    name
                )));
            }
        }
        Ok(0)
    }

    fn insert(&mut self, sql: &str) -> DatabaseResult<u64> {
        let insert = parse_insert(sql)?;
        let table = self.table_mut(&insert.table).ok_or_else(|| {
            DatabaseError::QueryFailed(format!("Table '{}' doesn't exist", insert.table))
        })?;

        let positions = if insert.columns.is_empty() {
            (0..table.columns.len()).collect::<Vec<_>>()
        } else {
            insert
                .columns
                .iter()
                .map(|name| {
                    table
                        .columns
                        .iter()
                        .position(|c| &c.name == name)
                        .ok_or_else(|| {
                            DatabaseError::QueryFailed(format!(
                                "Unknown column '{}' in '{}'",
                                name, table.name
                            ))
                        })
                })
                .collect::<DatabaseResult<Vec<_>>>()?
        };

        let mut rows = Vec::with_capacity(insert.rows.len());
        for (index, values) in insert.rows.into_iter().enumerate() {
            if values.len() != positions.len() {
                return Err(DatabaseError::QueryFailed(format!(
                    "Column count doesn't match value count at row {}",
                    index + 1
                )));
            }
            let mut row = vec![serde_json::Value::Null; table.columns.len()];
            for (position, value) in positions.iter().zip(values) {
                row[*position] = value;
            }
            rows.push(row);
        }

        let affected = rows.len() as u64;
        table.rows.extend(rows);
        Ok(affected)
    }

    fn apply(&mut self, sql: &str) -> DatabaseResult<u64> {
        if CREATE_TABLE.is_match(sql) {
            return self.create_table(sql);
        }
        if CREATE_VIEW.is_match(sql) {
            return self.create_view(sql);
        }
        if DROP_OBJECT.is_match(sql) {
            return self.drop_objects(sql);
        }
        if DROP_DATABASE.is_match(sql) {
            self.tables.clear();
            self.views.clear();
            return Ok(0);
        }
        if let Some(caps) = USE_DATABASE.captures(sql) {
            self.database = unquote_identifier_mysql(&caps[1]);
            return Ok(0);
        }
        if INSERT.is_match(sql) {
            return self.insert(sql);
        }
        trace!("memory backend ignoring statement: {}", sql);
        Ok(0)
    }

    fn query(&self, sql: &str) -> DatabaseResult<QueryResult> {
        if let Some(caps) = SHOW_CREATE.captures(sql) {
            let name = unquote_identifier_mysql(&caps[1]);
            let (columns, ddl) = if let Some(table) = self.table(&name) {
                (["Table", "Create Table"], table.ddl.clone())
            } else if let Some(view) = self.view(&name) {
                (["View", "Create View"], view.ddl.clone())
            } else {
                return Err(missing_table(&self.database, &name));
            };
            let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
            let row = row_from_pairs(&columns, vec![name.into(), ddl.into()]);
            return Ok(QueryResult::new(columns, vec![row]));
        }

        if let Some(caps) = SHOW_COLUMNS.captures(sql) {
            let name = unquote_identifier_mysql(&caps[1]);
            let table = self
                .table(&name)
                .ok_or_else(|| missing_table(&self.database, &name))?;
            let columns = vec!["Field".to_string(), "Type".to_string()];
            let rows = table
                .columns
                .iter()
                .map(|c| {
                    let values = vec![c.name.clone().into(), c.sql_type.clone().into()];
                    row_from_pairs(&columns, values)
                })
                .collect();
            return Ok(QueryResult::new(columns, rows));
        }

        if let Some(caps) = SELECT_ALL.captures(sql) {
            let name = unquote_identifier_mysql(&caps[1]);
            let table = self
                .table(&name)
                .ok_or_else(|| missing_table(&self.database, &name))?;
            let columns: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
            let rows = table
                .rows
                .iter()
                .map(|values| row_from_pairs(&columns, values.clone()))
                .collect();
            return Ok(QueryResult::new(columns, rows));
        }

        if SELECT_DATABASE.is_match(sql) {
            let columns = vec!["DATABASE()".to_string()];
            let row = row_from_pairs(&columns, vec![self.database.clone().into()]);
            return Ok(QueryResult::new(columns, vec![row]));
        }

        if let Some(caps) = SHOW_TABLES.captures(sql) {
            let full = caps.get(1).is_some();
            let mut columns = vec![format!("Tables_in_{}", self.database)];
            if full {
                columns.push("Table_type".to_string());
            }
            let objects = self
                .tables
                .iter()
                .map(|t| (t.name.clone(), "BASE TABLE"))
                .chain(self.views.iter().map(|v| (v.name.clone(), "VIEW")));
            let rows = objects
                .map(|(name, kind)| {
                    let mut values = vec![serde_json::Value::from(name)];
                    if full {
                        values.push(kind.into());
                    }
                    row_from_pairs(&columns, values)
                })
                .collect();
            return Ok(QueryResult::new(columns, rows));
        }

        Err(DatabaseError::QueryFailed(format!(
            "Unsupported query for the memory backend: {}",
            sql
        )))
    }
}

fn missing_table(database: &str, name: &str) -> DatabaseError {
    DatabaseError::QueryFailed(format!("Table '{}.{}' doesn't exist", database, name))
}

/// Parse exactly one MySQL statement
fn parse_statement(sql: &str) -> DatabaseResult<Statement> {
    let mut statements = Parser::parse_sql(&MySqlDialect {}, sql)
        .map_err(|e| DatabaseError::QueryFailed(format!("Syntax error: {}", e)))?;
    if statements.len() != 1 {
        return Err(DatabaseError::InvalidInput(format!(
            "Expected one statement, got {}",
            statements.len()
        )));
    }
    Ok(statements.remove(0))
}

/// Unqualified, unquoted object name
fn object_name(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_else(|| unquote_identifier_mysql(&name.to_string()))
}

struct ParsedInsert {
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<serde_json::Value>>,
}

fn parse_insert(sql: &str) -> DatabaseResult<ParsedInsert> {
    let insert = match parse_statement(sql)? {
        Statement::Insert(insert) => insert,
        _ => {
            return Err(DatabaseError::InvalidInput(format!(
                "Not an INSERT statement: {}",
                sql
            )));
        }
    };

    let table = match &insert.table {
        TableObject::TableName(name) => object_name(name),
        other => {
            return Err(DatabaseError::QueryFailed(format!(
                "Unsupported insert target: {}",
                other
            )));
        }
    };

    let values = match insert.source.as_deref().map(|query| query.body.as_ref()) {
        Some(SetExpr::Values(values)) => values,
        _ => {
            return Err(DatabaseError::QueryFailed(format!(
                "Only INSERT ... VALUES is supported: {}",
                sql
            )));
        }
    };

    let rows = values
        .rows
        .iter()
        .map(|row| row.iter().map(literal_value).collect::<DatabaseResult<Vec<_>>>())
        .collect::<DatabaseResult<Vec<_>>>()?;

    Ok(ParsedInsert {
        table,
        columns: insert.columns.iter().map(|c| c.value.clone()).collect(),
        rows,
    })
}

/// JSON value of a literal in a VALUES tuple
fn literal_value(expr: &Expr) -> DatabaseResult<serde_json::Value> {
    match expr {
        Expr::Value(value) => match &value.value {
            Value::Number(n, _) => Ok(number_value(n)),
            Value::SingleQuotedString(s)
            | Value::DoubleQuotedString(s)
            | Value::HexStringLiteral(s) => Ok(serde_json::Value::String(s.clone())),
            Value::Boolean(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Null => Ok(serde_json::Value::Null),
            other => Err(DatabaseError::QueryFailed(format!(
                "Unsupported literal: {}",
                other
            ))),
        },
        Expr::UnaryOp { op, expr: operand } => match (op, operand.as_ref()) {
            (UnaryOperator::Minus, Expr::Value(value)) => match &value.value {
                Value::Number(n, _) => Ok(number_value(&format!("-{}", n))),
                other => Err(DatabaseError::QueryFailed(format!(
                    "Unsupported literal: -{}",
                    other
                ))),
            },
            (UnaryOperator::Plus, inner) => literal_value(inner),
            _ => Err(DatabaseError::QueryFailed(format!(
                "Unsupported expression: {}",
                expr
            ))),
        },
        Expr::Nested(inner) => literal_value(inner),
        other => Err(DatabaseError::QueryFailed(format!(
            "Unsupported expression: {}",
            other
        ))),
    }
}

/// Integers stay numbers; other numerals keep their exact text
fn number_value(text: &str) -> serde_json::Value {
    match text.parse::<i64>() {
        Ok(i) => serde_json::Value::from(i),
        Err(_) => serde_json::Value::String(text.to_string()),
    }
}

/// In-memory MySQL-flavoured backend
///
/// Holds tables, views and rows behind a mutex. Helper methods seed data
/// directly; statements sent through [`DatabaseBackend::exec`] are applied
/// and recorded so tests can assert on them.
#[derive(Debug)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    dialect: String,
}

impl MemoryBackend {
    /// Create an empty backend whose current database is `database`
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                database: database.into(),
                ..MemoryState::default()
            }),
            dialect: "mysql".to_string(),
        }
    }

    /// Report another dialect name to the dump engine
    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    fn state(&self) -> DatabaseResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Lock error: {}", e)))
    }

    /// Create a table from its `CREATE TABLE` text (not recorded)
    pub fn create_table(&self, sql: &str) -> DatabaseResult<()> {
        self.state()?.create_table(sql).map(|_| ())
    }

    /// Create a view from its `CREATE VIEW` text (not recorded)
    pub fn create_view(&self, sql: &str) -> DatabaseResult<()> {
        self.state()?.create_view(sql).map(|_| ())
    }

    /// Append a row of values in column order (not recorded)
    pub fn insert_row(&self, table: &str, values: Vec<serde_json::Value>) -> DatabaseResult<()> {
        let mut state = self.state()?;
        let database = state.database.clone();
        let target = state
            .table_mut(table)
            .ok_or_else(|| missing_table(&database, table))?;
        if values.len() != target.columns.len() {
            return Err(DatabaseError::InvalidInput(format!(
                "Table {} has {} columns, got {} values",
                table,
                target.columns.len(),
                values.len()
            )));
        }
        target.rows.push(values);
        Ok(())
    }

    /// Make every statement containing `pattern` fail
    pub fn fail_on(&self, pattern: impl Into<String>) {
        if let Ok(mut state) = self.state() {
            state.fail_patterns.push(pattern.into());
        }
    }

    /// Statements successfully executed through `exec`, in order
    pub fn executed(&self) -> Vec<String> {
        self.state()
            .map(|s| s.executed.clone())
            .unwrap_or_default()
    }

    /// Name of the current database
    pub fn database(&self) -> String {
        self.state()
            .map(|s| s.database.clone())
            .unwrap_or_default()
    }

    /// Stored `CREATE` text of a table or view
    pub fn create_statement(&self, name: &str) -> Option<String> {
        let state = self.state().ok()?;
        state
            .table(name)
            .map(|t| t.ddl.clone())
            .or_else(|| state.view(name).map(|v| v.ddl.clone()))
    }

    /// Rows of a table, in insertion order
    pub fn table_rows(&self, table: &str) -> Option<Vec<Vec<serde_json::Value>>> {
        self.state().ok()?.table(table).map(|t| t.rows.clone())
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.state().ok()?.table(table).map(|t| t.rows.len())
    }
}

#[async_trait(?Send)]
impl DatabaseBackend for MemoryBackend {
    async fn schema(&self) -> DatabaseResult<SchemaInfo> {
        let state = self.state()?;
        Ok(SchemaInfo::new(
            state.database.clone(),
            state.tables.iter().map(|t| t.name.clone()).collect(),
            state.views.iter().map(|v| v.name.clone()).collect(),
        ))
    }

    async fn exec(&self, sql: &str) -> DatabaseResult<u64> {
        let mut state = self.state()?;
        state.check_failure(sql)?;
        let affected = state.apply(sql)?;
        state.executed.push(sql.to_string());
        Ok(affected)
    }

    async fn execute_query(&self, sql: &str) -> DatabaseResult<QueryResult> {
        let state = self.state()?;
        state.check_failure(sql)?;
        state.query(sql)
    }

    fn dialect(&self) -> &str {
        &self.dialect
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_identifier_mysql(name)
    }

    fn quote_string(&self, value: &str) -> String {
        quote_string_mysql(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const USERS: &str = "CREATE TABLE `users` (\n  `id` int(11) NOT NULL AUTO_INCREMENT,\n  `email` varchar(255) NOT NULL DEFAULT '',\n  `score` decimal(10,2) DEFAULT NULL,\n  PRIMARY KEY (`id`),\n  UNIQUE KEY `email` (`email`)\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";

    #[tokio::test]
    async fn test_create_table_parses_columns() {
        let backend = MemoryBackend::new("app");
        backend.create_table(USERS).unwrap();

        let result = backend.execute_query("SHOW COLUMNS FROM `users`").await.unwrap();
        let fields: Vec<(String, String)> = result
            .rows
            .iter()
            .map(|r| {
                (
                    r["Field"].as_str().unwrap().to_string(),
                    r["Type"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                ("id".to_string(), "int(11)".to_string()),
                ("email".to_string(), "varchar(255)".to_string()),
                ("score".to_string(), "decimal(10,2)".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_show_create_returns_stored_text() {
        let backend = MemoryBackend::new("app");
        backend.create_table(USERS).unwrap();

        let result = backend.execute_query("SHOW CREATE TABLE `users`").await.unwrap();
        assert_eq!(result.first_value(1).and_then(|v| v.as_str()), Some(USERS));
        assert!(backend.execute_query("SHOW CREATE TABLE `nope`").await.is_err());
    }

    #[tokio::test]
    async fn test_insert_statement_with_escapes() {
        let backend = MemoryBackend::new("app");
        backend.create_table(USERS).unwrap();

        let affected = backend
            .exec("INSERT INTO `users` (`id`, `email`, `score`) VALUES (1,\t'o\\'brien@example.com',\t-2.50\t),\n(2,\t'a\\nb',\tNULL\t)")
            .await
            .unwrap();
        assert_eq!(affected, 2);

        let rows = backend.table_rows("users").unwrap();
        assert_eq!(rows[0], vec![json!(1), json!("o'brien@example.com"), json!("-2.50")]);
        assert_eq!(rows[1], vec![json!(2), json!("a\nb"), serde_json::Value::Null]);
    }

    #[tokio::test]
    async fn test_insert_without_column_list() {
        let backend = MemoryBackend::new("app");
        backend
            .create_table("CREATE TABLE `t` (\n  `a` int,\n  `b` text\n)")
            .unwrap();
        backend.exec("INSERT INTO t VALUES (1, 'x')").await.unwrap();
        assert_eq!(backend.row_count("t"), Some(1));

        let err = backend.exec("INSERT INTO t VALUES (1)").await.unwrap_err();
        assert!(err.to_string().contains("Column count"));
    }

    #[tokio::test]
    async fn test_select_all_preserves_column_order() {
        let backend = MemoryBackend::new("app");
        backend
            .create_table("CREATE TABLE `t` (\n  `z` int,\n  `a` text\n)")
            .unwrap();
        backend.insert_row("t", vec![json!(1), json!("x")]).unwrap();

        let result = backend.execute_query("SELECT * FROM `t`").await.unwrap();
        assert_eq!(result.columns, vec!["z".to_string(), "a".to_string()]);
        assert_eq!(result.rows[0]["a"], json!("x"));
    }

    #[tokio::test]
    async fn test_schema_separates_tables_and_views() {
        let backend = MemoryBackend::new("shop");
        backend.create_table(USERS).unwrap();
        backend
            .create_view("CREATE ALGORITHM=UNDEFINED DEFINER=`root`@`localhost` SQL SECURITY DEFINER VIEW `active_users` AS select `id` from `users`")
            .unwrap();

        let schema = backend.schema().await.unwrap();
        assert_eq!(schema.database, "shop");
        assert_eq!(schema.tables, vec!["users".to_string()]);
        assert_eq!(schema.views, vec!["active_users".to_string()]);

        let tables = backend.execute_query("SHOW FULL TABLES").await.unwrap();
        assert_eq!(tables.columns[0], "Tables_in_shop");
        assert_eq!(tables.rows[1]["Table_type"], json!("VIEW"));
    }

    #[tokio::test]
    async fn test_drop_and_recreate() {
        let backend = MemoryBackend::new("app");
        backend.exec(USERS).await.unwrap();
        assert!(backend.exec(USERS).await.is_err());

        backend.exec("DROP TABLE IF EXISTS `users`").await.unwrap();
        backend.exec("DROP TABLE IF EXISTS `users`").await.unwrap();
        assert!(backend.exec("DROP TABLE `users`").await.is_err());
        backend.exec(USERS).await.unwrap();
        assert!(backend.create_statement("users").is_some());
    }

    #[tokio::test]
    async fn test_drop_database_and_use() {
        let backend = MemoryBackend::new("app");
        backend.create_table(USERS).unwrap();

        backend.exec("DROP DATABASE IF EXISTS `shop`").await.unwrap();
        backend.exec("USE `shop`").await.unwrap();
        let schema = backend.schema().await.unwrap();
        assert_eq!(schema.database, "shop");
        assert!(schema.tables.is_empty());
    }

    #[tokio::test]
    async fn test_fail_on_pattern() {
        let backend = MemoryBackend::new("app");
        backend.fail_on("LOCK TABLES");

        backend.exec("SET NAMES utf8").await.unwrap();
        assert!(backend.exec("LOCK TABLES `a` READ").await.is_err());
        assert_eq!(backend.executed(), vec!["SET NAMES utf8".to_string()]);
    }

    #[test]
    fn test_dialect_override() {
        let backend = MemoryBackend::new("app").with_dialect("sqlite");
        assert_eq!(backend.dialect(), "sqlite");
        assert_eq!(MemoryBackend::new("app").dialect(), "mysql");
    }

    #[tokio::test]
    async fn test_create_table_if_not_exists_and_syntax_errors() {
        let backend = MemoryBackend::new("app");
        backend.create_table(USERS).unwrap();

        backend
            .exec("CREATE TABLE IF NOT EXISTS `users` (`id` int)")
            .await
            .unwrap();
        assert_eq!(backend.create_statement("users").as_deref(), Some(USERS));

        let err = backend.exec("CREATE TABLE `broken` (`id` int").await.unwrap_err();
        assert!(err.to_string().contains("Syntax error"));
        assert!(backend.create_statement("broken").is_none());
    }

    #[tokio::test]
    async fn test_drop_several_tables_at_once() {
        let backend = MemoryBackend::new("app");
        backend.create_table("CREATE TABLE `a` (`id` int)").unwrap();
        backend.create_table("CREATE TABLE `b` (`id` int)").unwrap();
        backend.create_table("CREATE TABLE `c` (`id` int)").unwrap();

        backend.exec("DROP TABLE `a`, `b`").await.unwrap();
        assert_eq!(backend.schema().await.unwrap().tables, vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn test_insert_literal_kinds() {
        let backend = MemoryBackend::new("app");
        backend
            .create_table("CREATE TABLE `t` (`a` int, `b` double, `c` tinyint(1), `d` blob)")
            .unwrap();

        backend
            .exec("INSERT INTO `t` VALUES (+7, 1.50, TRUE, X'CAFE'), (-0, -0.25, FALSE, NULL)")
            .await
            .unwrap();
        let rows = backend.table_rows("t").unwrap();
        assert_eq!(rows[0], vec![json!(7), json!("1.50"), json!(true), json!("CAFE")]);
        assert_eq!(rows[1], vec![json!(0), json!("-0.25"), json!(false), serde_json::Value::Null]);

        assert!(backend.exec("INSERT INTO `t` SELECT * FROM `t`").await.is_err());
    }
}
