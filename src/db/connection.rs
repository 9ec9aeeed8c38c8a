use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

/// Handle to the on-disk book database. The store only remembers where the
/// file lives; every operation opens a fresh connection and drops it before
/// returning, so nothing stays locked between user actions.
#[derive(Debug, Clone)]
pub struct BookStore {
    path: PathBuf,
}

impl BookStore {
    /// Point the store at a database file. Nothing touches the disk until
    /// `ensure_schema` or one of the row operations runs.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the SQLite file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the data directory and the `books` table if either is missing.
    /// Safe to call on every startup.
    pub fn ensure_schema(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("failed to create data directory")?;
            }
        }

        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                genre TEXT,
                year_published INTEGER
            )",
            [],
        )
        .context("failed to create books table")?;

        debug!(path = %self.path.display(), "book schema ready");
        Ok(())
    }

    /// Open a short-lived connection for a single statement.
    pub(crate) fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path).context("failed to open SQLite database")
    }
}
