//! Database Connection and Setup
//!
//! Manages SQLite database connection and migrations.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::DomainError;

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    pub conn: Arc<Mutex<Connection>>,
    pub db_path: PathBuf,
}

impl DbState {
    /// Shared handle for repositories
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

/// Initialize database with path
///
/// `:memory:` opens a private in-memory database.
pub async fn init_db(db_path: &Path) -> Result<DbState, String> {
    if let Some(dir) = db_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create db directory: {}", e))?;
        }
    }

    let conn = Connection::open(db_path).map_err(|e| format!("Failed to open db: {}", e))?;

    run_migrations(&conn)?;

    log::info!("Database ready at {}", db_path.display());

    Ok(DbState {
        conn: Arc::new(Mutex::new(conn)),
        db_path: db_path.to_path_buf(),
    })
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(names) = stmt.query_map([], |row| row.get::<_, String>(1)) else {
        return false;
    };
    for name in names.flatten() {
        if name == column {
            return true;
        }
    }
    false
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| format!("Failed to enable foreign keys: {}", e))?;

    // Categories table - create if not exists
    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            parent_id INTEGER REFERENCES categories(id) ON DELETE RESTRICT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    // Description was added after the first schema
    if !column_exists(conn, "categories", "description") {
        conn.execute("ALTER TABLE categories ADD COLUMN description TEXT", [])
            .map_err(|e| format!("Failed to add description: {}", e))?;
    }

    // Create index for faster parent-child queries
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id)",
        [],
    )
    .map_err(|e| e.to_string())?;

    // Book-category join table; books live in another service
    conn.execute(
        "CREATE TABLE IF NOT EXISTS book_categories (
            book_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE RESTRICT,
            created_at INTEGER NOT NULL,
            PRIMARY KEY (book_id, category_id)
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_book_categories_category ON book_categories(category_id)",
        [],
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.db");

        init_db(&path).await.expect("first init");
        let state = init_db(&path).await.expect("second init");

        let conn = state.conn.lock().await;
        assert!(column_exists(&conn, "categories", "description"));
        assert!(column_exists(&conn, "book_categories", "book_id"));
        assert!(!column_exists(&conn, "categories", "missing"));
    }
}
