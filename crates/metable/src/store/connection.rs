//! SQLite connection management.
//!
//! A single connection behind a `parking_lot::Mutex`. SQLite allows one
//! writer at a time anyway, and every metadata operation is a short
//! synchronous statement.

use super::schema;
use crate::config::SqliteConfig;
use crate::error::{MetaError, Result};
use crate::json;
use parking_lot::Mutex;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared handle to the metadata database.
#[derive(Clone)]
pub struct SqlitePool {
    conn: Arc<Mutex<Connection>>,
    config: SqliteConfig,
}

impl SqlitePool {
    /// Open (or create) the database described by `config` and migrate it.
    pub fn new(config: SqliteConfig) -> Result<Self> {
        info!(path = ?config.path, "Opening metadata database");

        let conn = if config.is_memory() {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Connection::open(&config.path)?
        };

        let pool = Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        };
        pool.initialize()?;
        Ok(pool)
    }

    /// Private in-memory database, for tests.
    pub fn memory() -> Result<Self> {
        Self::new(SqliteConfig::memory())
    }

    /// Execute a closure with the connection
    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    fn initialize(&self) -> Result<()> {
        self.with_connection(|conn| {
            self.configure_pragmas(conn)?;
            register_functions(conn)?;
            schema::apply_migrations(conn)?;
            info!("Metadata database ready");
            Ok(())
        })
    }

    fn configure_pragmas(&self, conn: &Connection) -> Result<()> {
        debug!(wal = self.config.wal_mode, "Configuring SQLite pragmas");

        if self.config.wal_mode && !self.config.is_memory() {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        }

        conn.execute_batch(&format!(
            "PRAGMA busy_timeout = {};",
            self.config.busy_timeout_ms
        ))?;
        conn.execute_batch("PRAGMA temp_store = MEMORY;")?;
        Ok(())
    }
}

/// Register the value predicates used by searches.
///
/// - `meta_json_contains(value_json, path, needle_json)`: `path` may be NULL
///   or empty (match at the root); `needle_json` NULL means "anything at the
///   path".
/// - `meta_like(value_json, needle)`: substring match on the decoded value.
///
/// Malformed stored JSON never matches.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "meta_like",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: String = ctx.get(0)?;
            let needle: String = ctx.get(1)?;
            Ok(serde_json::from_str::<serde_json::Value>(&value)
                .is_ok_and(|value| json::like(&value, &needle)))
        },
    )?;

    conn.create_scalar_function(
        "meta_json_contains",
        3,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: String = ctx.get(0)?;
            let path: Option<String> = ctx.get(1)?;
            let needle: Option<String> = ctx.get(2)?;

            let Ok(value) = serde_json::from_str::<serde_json::Value>(&value) else {
                return Ok(false);
            };
            let needle = match needle {
                Some(text) => Some(
                    serde_json::from_str::<serde_json::Value>(&text)
                        .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?,
                ),
                None => None,
            };

            Ok(json::contains_at(
                &value,
                path.as_deref().unwrap_or(""),
                needle.as_ref(),
            ))
        },
    )
    .map_err(MetaError::from)
}
