//! [`Store`]: shared handle over the SQLite database.

use std::path::PathBuf;
use std::sync::Arc;

use common::protocol::{Entry, Task, PREVIEW_LEN};
use rusqlite::Connection;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors produced by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create database directory: {0}")]
    Directory(String),
}

/// Cloneable handle to the journal database.
///
/// A single connection behind an `Arc<Mutex<_>>`: writes and reads serialise,
/// which is ample for a single-user service, and the handle can be cloned into
/// every request handler without copying anything.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the database at `path` and initialise the schema.
    ///
    /// Parent directories are created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Directory`] if the parent directory cannot be
    /// created, or [`StoreError::Sqlite`] on any SQLite failure.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db_path = PathBuf::from(path);
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Directory(e.to_string()))?;
            }
        }
        Self::from_connection(Connection::open(&db_path)?)
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Returns `true` if the database answers a probe query.
    pub async fn ping(&self) -> bool {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }

    // -- entries ------------------------------------------------------------

    /// Insert or update the entry for `date`.
    pub async fn upsert_entry(&self, date: &str, content: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO entries (date, content, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(date) DO UPDATE SET
                 content = excluded.content,
                 updated_at = excluded.updated_at",
            rusqlite::params![date, content, now_stamp()],
        )?;
        Ok(())
    }

    /// Fetch the entry for `date`, or `None` if no entry was ever saved.
    pub async fn entry(&self, date: &str) -> Result<Option<Entry>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT date, content FROM entries WHERE date = ?1")?;
        let result = stmt.query_row(rusqlite::params![date], row_to_entry);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::from(e)),
        }
    }

    /// List all entries newest-first, with `content` truncated to the preview
    /// length.
    pub async fn list_entries(&self) -> Result<Vec<Entry>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT date, substr(content, 1, ?1) FROM entries ORDER BY date DESC",
        )?;
        let entries = stmt
            .query_map(rusqlite::params![PREVIEW_LEN as i64], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // -- tasks --------------------------------------------------------------

    /// Replace the entire task list in one transaction.
    ///
    /// The previous list is deleted wholesale; on any insert failure the
    /// transaction rolls back and the previous list survives intact.
    pub async fn replace_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM tasks", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO tasks (id, text, completed, \"order\") VALUES (?1, ?2, ?3, ?4)",
            )?;
            for task in tasks {
                stmt.execute(rusqlite::params![
                    task.id,
                    task.text,
                    if task.completed { 1 } else { 0 },
                    task.order,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Fetch all tasks ordered by `"order"` ascending.
    pub async fn tasks(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, text, completed, \"order\" FROM tasks ORDER BY \"order\" ASC",
        )?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }
}

fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS entries (
            date            TEXT PRIMARY KEY,
            content         TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id              TEXT PRIMARY KEY,
            text            TEXT NOT NULL,
            completed       INTEGER NOT NULL DEFAULT 0,
            \"order\"       INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_order ON tasks(\"order\")",
        [],
    )?;

    Ok(())
}

fn row_to_entry(row: &rusqlite::Row) -> Result<Entry, rusqlite::Error> {
    Ok(Entry {
        date: row.get(0)?,
        content: row.get(1)?,
    })
}

fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    Ok(Task {
        id: row.get(0)?,
        text: row.get(1)?,
        completed: row.get::<_, i64>(2)? != 0,
        order: row.get(3)?,
    })
}

fn now_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
