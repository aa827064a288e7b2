//! DuckDB-backed SQL runner

use super::split_statements;
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use bytes::Bytes;
use duckdb::Connection;
use std::path::Path;
use tracing::info;

/// Runs SQL scripts against the configured Postgres server through DuckDB.
pub struct SqlRunner {
    conn: Connection,
}

impl SqlRunner {
    /// Open an in-memory DuckDB connection and attach the configured server.
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::database(format!("Failed to open DuckDB connection: {e}")))?;

        let attach = format!(
            "INSTALL postgres; LOAD postgres;\n\
             ATTACH 'postgresql://{user}:{password}@{host}:{port}/{database}' \
             AS source_db (TYPE postgres);\n\
             USE source_db;",
            user = config.user,
            password = config.password,
            host = config.host,
            port = config.port,
            database = config.database,
        );
        conn.execute_batch(&attach).map_err(|e| {
            Error::database(format!(
                "Failed to attach postgres database '{}@{}': {e}",
                config.database, config.host
            ))
        })?;

        Ok(Self { conn })
    }

    /// Run one script file and return the last statement's result as CSV.
    pub fn run_script(&self, path: &Path) -> Result<Bytes> {
        if !path.is_file() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let script = std::fs::read_to_string(path)?;
        let statements = split_statements(&script);
        let Some((result_query, side_effects)) = statements.split_last() else {
            return Err(Error::EmptyScript {
                path: path.display().to_string(),
            });
        };

        for statement in side_effects {
            self.conn
                .execute_batch(statement)
                .map_err(|e| Error::database(format!("Statement failed: {e}")))?;
        }
        info!(
            script = %path.display(),
            statements = statements.len(),
            "Executing SQL script"
        );

        self.capture_csv(result_query)
    }

    fn capture_csv(&self, query: &str) -> Result<Bytes> {
        let out_path = std::env::temp_dir().join(format!("wms_extract_sql_{}.csv", nanos()));
        let out_str = out_path
            .to_str()
            .ok_or_else(|| Error::database(format!("Non-UTF-8 temp path: {}", out_path.display())))?;

        let copy_sql = format!("COPY ({query}) TO '{out_str}' (FORMAT CSV, HEADER true);");
        self.conn
            .execute_batch(&copy_sql)
            .map_err(|e| Error::database(format!("Result query failed: {e}")))?;

        let content = std::fs::read(&out_path)?;
        let _ = std::fs::remove_file(&out_path);
        Ok(Bytes::from(content))
    }

    #[cfg(test)]
    fn open_in_memory() -> Self {
        Self {
            conn: Connection::open_in_memory().unwrap(),
        }
    }
}

fn nanos() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_script(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_run_script_executes_setup_then_captures_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(
            &dir,
            "report.sql",
            "CREATE TABLE t (a INT, b VARCHAR);\n\
             INSERT INTO t VALUES (1, 'x'), (2, 'y');\n\
             SELECT a, b FROM t ORDER BY a;",
        );

        let runner = SqlRunner::open_in_memory();
        let output = runner.run_script(&path).unwrap();
        let text = String::from_utf8(output.to_vec()).unwrap();
        assert_eq!(text, "a,b\n1,x\n2,y\n");
    }

    #[test]
    fn test_run_script_missing_file() {
        let runner = SqlRunner::open_in_memory();
        let err = runner
            .run_script(Path::new("/nonexistent/report.sql"))
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_run_script_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "empty.sql", "  \n;\n");

        let runner = SqlRunner::open_in_memory();
        let err = runner.run_script(&path).unwrap_err();
        assert!(matches!(err, Error::EmptyScript { .. }));
    }
}
