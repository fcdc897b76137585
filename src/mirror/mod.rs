// Mirror store — the durable local record of which forum-side objects
// correspond to which scoring-engine objects.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever HERALD_DB_PATH points
// (defaults to ./herald.db). This is the only state that survives between
// reconciliation passes; everything else is re-fetched fresh.

pub mod models;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod traits;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub use sqlite::SqliteMirror;
pub use traits::MirrorStore;

/// Open (or create) the database and run migrations.
///
/// This is the main entry point — called by `herald init` and by any
/// command that needs mirror access.
pub fn initialize(db_path: &str) -> Result<Arc<dyn MirrorStore>> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {db_path}"))?;
        }
    }

    let conn = open_connection(db_path)?;
    schema::create_tables(&conn)?;

    Ok(Arc::new(SqliteMirror::new(conn)))
}

/// Open an existing database (fails if it doesn't exist yet).
pub fn open(db_path: &str) -> Result<Arc<dyn MirrorStore>> {
    if !Path::new(db_path).exists() {
        anyhow::bail!("Database not found at {}. Run `herald init` first.", db_path);
    }

    let conn = open_connection(db_path)?;
    schema::create_tables(&conn)?;

    Ok(Arc::new(SqliteMirror::new(conn)))
}

fn open_connection(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {db_path}"))?;

    // WAL for concurrent reads; foreign keys on so deleting a team row
    // cascades to its post rows.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    Ok(conn)
}
