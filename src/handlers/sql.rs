use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};

/// Counts rows in the `users` table of `database.db`.
pub struct UserCountHandler {
    db: PathBuf,
    output: PathBuf,
}

impl UserCountHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            db: data_dir.join("database.db"),
            output: data_dir.join("query_result.txt"),
        }
    }
}

/// Open a database that must already exist. Read-only, so a missing file is
/// an error instead of a fresh empty database.
pub fn open_existing(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("failed to open database {}", path.display()))
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}

#[async_trait]
impl Handler for UserCountHandler {
    fn name(&self) -> &str {
        "sql-query"
    }

    fn description(&self) -> &str {
        "count users in database.db"
    }

    async fn run(&self) -> Result<TaskReply> {
        let db = self.db.clone();
        let count = tokio::task::spawn_blocking(move || -> Result<i64> {
            let conn = open_existing(&db)?;
            count_users(&conn)
        })
        .await??;
        tokio::fs::write(&self.output, count.to_string())
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("SQL query executed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_rows() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO users (name) VALUES ('a'), ('b'), ('c');",
        )
        .unwrap();
        assert_eq!(count_users(&conn).unwrap(), 3);
    }

    #[test]
    fn open_existing_refuses_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.db");
        let err = open_existing(&path).unwrap_err();
        assert!(err.to_string().contains("nope.db"));
        assert!(!path.exists());
    }
}
