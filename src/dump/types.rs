//! Column type classification for value serialization

use once_cell::sync::Lazy;
use regex::Regex;

/// Numeric type keywords as they appear in MySQL `SHOW COLUMNS` output
static MYSQL_NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^[^(]*(BYTE|COUNTER|SERIAL|INT|LONG$|CURRENCY|REAL|MONEY|FLOAT|DOUBLE|DECIMAL|NUMERIC|NUMBER)",
    )
    .expect("numeric type pattern is valid")
});

/// Decides whether values of a column type are written as bare numbers
#[derive(Debug, Clone)]
pub struct NumericTypes {
    pattern: Regex,
}

impl NumericTypes {
    /// Type table for MySQL and MariaDB
    pub fn mysql() -> Self {
        Self {
            pattern: MYSQL_NUMERIC.clone(),
        }
    }

    /// Custom type table for another dialect
    pub fn with_pattern(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// True when `type_string` names a numeric column type
    pub fn is_numeric(&self, type_string: &str) -> bool {
        self.pattern.is_match(type_string)
    }
}

impl Default for NumericTypes {
    fn default() -> Self {
        Self::mysql()
    }
}

/// True when a MySQL column type string names a numeric type
pub fn is_numeric_sql_type(type_string: &str) -> bool {
    MYSQL_NUMERIC.is_match(type_string)
}

/// Render a value of a numeric column without quotes
///
/// Returns `None` when the value cannot be written as a bare number,
/// in which case the caller quotes it as a string.
pub fn numeric_literal(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        serde_json::Value::String(s) => {
            let normalized = s.trim().replace(',', ".");
            if normalized.is_empty() {
                return None;
            }
            match normalized.parse::<f64>() {
                Ok(n) if n.is_finite() => Some(normalized),
                _ => None,
            }
        }
        _ => None,
    }
}
