//! Identifier and string-literal quoting for MySQL-compatible dialects

/// Quote an identifier with backticks, doubling embedded backticks
pub fn quote_identifier_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Escape a string the way `mysql_real_escape_string` does and wrap it in quotes
pub fn quote_string_mysql(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\u{1a}' => out.push_str("\\Z"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Strip one layer of backtick quoting, if present
pub fn unquote_identifier_mysql(name: &str) -> String {
    let trimmed = name.trim();
    match trimmed
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        Some(inner) => inner.replace("``", "`"),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier_mysql("users"), "`users`");
        assert_eq!(quote_identifier_mysql("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_quote_string_escapes_specials() {
        assert_eq!(quote_string_mysql("Pen"), "'Pen'");
        assert_eq!(quote_string_mysql("O'Brien"), "'O\\'Brien'");
        assert_eq!(quote_string_mysql("a\nb"), "'a\\nb'");
        assert_eq!(quote_string_mysql("c:\\dir"), "'c:\\\\dir'");
        assert_eq!(quote_string_mysql("say \"hi\""), "'say \\\"hi\\\"'");
    }

    #[test]
    fn test_unquote_identifier() {
        assert_eq!(unquote_identifier_mysql("`users`"), "users");
        assert_eq!(unquote_identifier_mysql("users"), "users");
        assert_eq!(unquote_identifier_mysql("`we``ird`"), "we`ird");
    }
}
