//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared connection slot; empty until initialization finishes
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Database state wrapper
#[derive(Clone, Default)]
pub struct DbState {
    pub conn: SharedConnection,
}

impl DbState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the connection of a freshly initialized state into this one
    pub async fn replace_with(&self, other: DbState) {
        let conn = other.conn.lock().await.take();
        *self.conn.lock().await = conn;
    }
}

/// Open the database at `db_path` (`:memory:` for an in-memory one) and migrate it
pub async fn init_db(db_path: &Path) -> Result<DbState, String> {
    let conn = if db_path == Path::new(":memory:") {
        Connection::open_in_memory()
    } else {
        Connection::open(db_path)
    }
    .map_err(|e| format!("Failed to open db {}: {}", db_path.display(), e))?;

    run_migrations(&conn)?;

    let state = DbState::new();
    *state.conn.lock().await = Some(conn);
    Ok(state)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")
        .map_err(|e| format!("Failed to set journal mode: {}", e))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS entities (
            entity_type TEXT NOT NULL,
            id TEXT NOT NULL,
            data TEXT NOT NULL DEFAULT '{}',
            created_date TEXT NOT NULL,
            updated_date TEXT NOT NULL,
            PRIMARY KEY (entity_type, id)
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_entities_type_created ON entities(entity_type, created_date)",
        [],
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_repeatable() {
        let state = init_db(Path::new(":memory:")).await.unwrap();
        let guard = state.conn.lock().await;
        let conn = guard.as_ref().unwrap();
        run_migrations(conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    async fn is_ready(state: &DbState) -> bool {
        state.conn.lock().await.is_some()
    }

    #[tokio::test]
    async fn test_replace_with_moves_connection() {
        let empty = DbState::new();
        assert!(!is_ready(&empty).await);
        let ready = init_db(Path::new(":memory:")).await.unwrap();
        empty.replace_with(ready.clone()).await;
        assert!(is_ready(&empty).await);
        assert!(!is_ready(&ready).await);
    }
}
