//! Size-bounded multi-row `INSERT` accumulator

/// Maximum length of one generated `INSERT` statement, in bytes
pub const MAX_SQL_SIZE: usize = 1_000_000;

/// Accumulates value tuples into multi-row `INSERT` statements
///
/// Tuples are appended to the current statement until its length crosses
/// the threshold, at which point the statement is terminated with `;` and
/// the next tuple opens a new `INSERT`.
#[derive(Debug)]
pub struct InsertBatch {
    header: String,
    max_size: usize,
    size: usize,
    sql: String,
    rows: usize,
    statements: usize,
}

impl InsertBatch {
    /// Create a batch for `table` (already quoted) and its quoted columns
    pub fn new(table: &str, columns: &[String]) -> Self {
        Self::with_max_size(table, columns, MAX_SQL_SIZE)
    }

    /// Create a batch with a custom flush threshold
    pub fn with_max_size(table: &str, columns: &[String], max_size: usize) -> Self {
        Self {
            header: format!("INSERT INTO {} ({}) VALUES ", table, columns.join(", ")),
            max_size,
            size: 0,
            sql: String::new(),
            rows: 0,
            statements: 0,
        }
    }

    /// Append one row of already-rendered SQL values
    pub fn push_row(&mut self, values: &[String]) {
        let tuple = format!("({}\t)", values.join(",\t"));
        let before = self.sql.len();
        if self.size == 0 {
            self.sql.push_str(&self.header);
        } else {
            self.sql.push_str(",\n");
        }
        self.sql.push_str(&tuple);
        self.size += self.sql.len() - before;
        self.rows += 1;

        if self.size > self.max_size {
            self.flush();
        }
    }

    fn flush(&mut self) {
        self.sql.push_str(";\n");
        self.size = 0;
        self.statements += 1;
        tracing::debug!(statements = self.statements, rows = self.rows, "flushed insert batch");
    }

    /// Rows appended so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Terminated statements so far
    pub fn statements(&self) -> usize {
        self.statements
    }

    /// Terminate any open statement and return the generated SQL
    pub fn finish(mut self) -> String {
        if self.size > 0 {
            self.flush();
        }
        self.sql
    }
}
