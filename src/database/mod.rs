//! SQL script execution against the operational database
//!
//! Scripts run through DuckDB with its `postgres` extension attached to the
//! configured server. Every statement but the last executes for its side
//! effects; the last statement is the result query and its output is
//! captured as CSV.

mod engine;

pub use engine::SqlRunner;

/// Split a script into individual statements.
///
/// Statements are separated by `;`. Whitespace-only fragments (a trailing
/// semicolon, blank lines between statements) are dropped.
pub fn split_statements(script: &str) -> Vec<&str> {
    script
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_statements_drops_empty_fragments() {
        let script = "CREATE TABLE t (a INT);\n\nINSERT INTO t VALUES (1);\nSELECT * FROM t;\n";
        let statements = split_statements(script);
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE t (a INT)",
                "INSERT INTO t VALUES (1)",
                "SELECT * FROM t"
            ]
        );
    }

    #[test]
    fn test_split_statements_single_query_no_semicolon() {
        assert_eq!(split_statements("SELECT 1"), vec!["SELECT 1"]);
    }

    #[test]
    fn test_split_statements_empty_script() {
        assert!(split_statements("  \n ; ; \n").is_empty());
    }
}
