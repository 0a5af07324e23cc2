//! Schema management and migrations

use crate::error::{MetaError, Result};
use rusqlite::Connection;
use tracing::{debug, info};

/// Schema version - increment when making schema changes
const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations
pub fn apply_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version = current_version(conn)?;
    debug!(current_version, target_version = SCHEMA_VERSION, "Checking migrations");

    if current_version < 1 {
        info!(from = current_version, to = SCHEMA_VERSION, "Applying schema migrations");
        apply_migration_v1(conn)?;
    }

    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<i32> {
    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

fn record_migration(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("INSERT INTO schema_migrations (version) VALUES (?1)", [version])?;
    Ok(())
}

fn apply_migration_v1(conn: &Connection) -> Result<()> {
    debug!("Applying migration v1: meta table");

    conn.execute_batch(SCHEMA_V1)
        .map_err(|e| MetaError::Store(format!("Failed to apply v1 schema: {}", e)))?;

    record_migration(conn, 1)?;
    info!("Migration v1 applied successfully");
    Ok(())
}

/// One row per metadata record. `seq` keeps insertion order; `id` is the
/// record's public identifier. There is no uniqueness on
/// (owner_type, owner_id, key): appends may repeat a key.
const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    owner_type TEXT NOT NULL,
    owner_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL CHECK (json_valid(value) AND value <> 'null')
);

CREATE INDEX IF NOT EXISTS idx_meta_owner_key ON meta(owner_type, owner_id, key);
CREATE INDEX IF NOT EXISTS idx_meta_key ON meta(key);
"#;
