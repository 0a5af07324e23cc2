//! [`MetaStore`] implementation on SQLite.

use super::connection::SqlitePool;
use super::MetaStore;
use crate::config::SqliteConfig;
use crate::error::Result;
use crate::model::{KeyFilter, MetaRecord, MetaSearch, Owner, OwnerId, OwnerType, ValueMatch};
use rusqlite::types::{Type, Value as SqlValue};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT id, owner_type, owner_id, key, value FROM meta";

/// SQLite-backed metadata store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn open(config: SqliteConfig) -> Result<Self> {
        Ok(Self::new(SqlitePool::new(config)?))
    }

    fn query_records(&self, sql: &str, args: Vec<SqlValue>) -> Result<Vec<MetaRecord>> {
        self.pool.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params_from_iter(args.iter()), row_to_record)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<MetaRecord> {
    let id: String = row.get(0)?;
    let owner_type: String = row.get(1)?;
    let owner_id: String = row.get(2)?;
    let key: String = row.get(3)?;
    let value: String = row.get(4)?;

    let id = Uuid::from_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let value = serde_json::from_str(&value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(MetaRecord {
        id,
        owner: Owner::new(OwnerType::new(owner_type), owner_id),
        key,
        value,
    })
}

fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Owner predicate plus key filter, with its bound arguments.
fn owner_clause(owner: &Owner, filter: &KeyFilter) -> (String, Vec<SqlValue>) {
    let mut sql = String::from(" WHERE owner_type = ? AND owner_id = ?");
    let mut args = vec![
        text(owner.owner_type.as_str()),
        text(owner.owner_id.as_str()),
    ];

    match &filter.only {
        Some(only) if only.is_empty() => sql.push_str(" AND 0"),
        Some(only) => {
            sql.push_str(&format!(" AND key IN ({})", placeholders(only.len())));
            args.extend(only.iter().map(|k| text(k)));
        }
        None => {}
    }
    if !filter.except.is_empty() {
        sql.push_str(&format!(
            " AND key NOT IN ({})",
            placeholders(filter.except.len())
        ));
        args.extend(filter.except.iter().map(|k| text(k)));
    }
    (sql, args)
}

impl MetaStore for SqliteStore {
    fn create(&self, owner: &Owner, key: &str, value: Value) -> Result<MetaRecord> {
        let record = MetaRecord::new(owner.clone(), key, value);
        let encoded = serde_json::to_string(&record.value)?;

        self.pool.with_connection(|conn| {
            conn.execute(
                "INSERT INTO meta (id, owner_type, owner_id, key, value) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id.to_string(),
                    owner.owner_type.as_str(),
                    owner.owner_id.as_str(),
                    key,
                    encoded,
                ],
            )?;
            Ok(())
        })?;

        Ok(record)
    }

    fn find(&self, owner: &Owner, key: &str) -> Result<Option<MetaRecord>> {
        self.pool.with_connection(|conn| {
            let record = conn
                .query_row(
                    &format!(
                        "{SELECT_COLUMNS} WHERE owner_type = ?1 AND owner_id = ?2 AND key = ?3 ORDER BY seq LIMIT 1"
                    ),
                    params![owner.owner_type.as_str(), owner.owner_id.as_str(), key],
                    row_to_record,
                )
                .optional()?;
            Ok(record)
        })
    }

    fn find_many(&self, owner: &Owner, filter: &KeyFilter) -> Result<Vec<MetaRecord>> {
        let (clause, args) = owner_clause(owner, filter);
        self.query_records(&format!("{SELECT_COLUMNS}{clause} ORDER BY seq"), args)
    }

    fn count(&self, owner: &Owner, filter: &KeyFilter) -> Result<usize> {
        let (clause, args) = owner_clause(owner, filter);
        self.pool.with_connection(|conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM meta{clause}"),
                params_from_iter(args.iter()),
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }

    fn update(&self, id: &Uuid, value: Value) -> Result<bool> {
        let encoded = serde_json::to_string(&value)?;
        self.pool.with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE meta SET value = ?2 WHERE id = ?1",
                params![id.to_string(), encoded],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete(&self, id: &Uuid) -> Result<bool> {
        self.pool.with_connection(|conn| {
            let removed = conn.execute("DELETE FROM meta WHERE id = ?1", params![id.to_string()])?;
            Ok(removed > 0)
        })
    }

    fn delete_where(
        &self,
        owner: &Owner,
        key: Option<&str>,
        value: Option<&Value>,
    ) -> Result<usize> {
        let (mut clause, mut args) = owner_clause(owner, &KeyFilter::all());
        if let Some(key) = key {
            clause.push_str(" AND key = ?");
            args.push(text(key));
        }
        if let Some(value) = value {
            clause.push_str(" AND value = ?");
            args.push(SqlValue::Text(serde_json::to_string(value)?));
        }

        let removed = self.pool.with_connection(|conn| {
            Ok(conn.execute(&format!("DELETE FROM meta{clause}"), params_from_iter(args.iter()))?)
        })?;
        debug!(%owner, ?key, removed, "Deleted metadata records");
        Ok(removed)
    }

    fn search(&self, search: &MetaSearch) -> Result<Vec<MetaRecord>> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE key = ?");
        let mut args = vec![text(&search.key)];

        if let Some(owner_type) = &search.owner_type {
            sql.push_str(" AND owner_type = ?");
            args.push(text(owner_type.as_str()));
        }

        match &search.value {
            ValueMatch::Any => {}
            ValueMatch::Like(needle) => {
                sql.push_str(" AND meta_like(value, ?)");
                args.push(text(needle));
            }
            ValueMatch::JsonContains { path, needle } => {
                sql.push_str(" AND meta_json_contains(value, ?, ?)");
                args.push(text(path));
                args.push(match needle {
                    Some(needle) => SqlValue::Text(serde_json::to_string(needle)?),
                    None => SqlValue::Null,
                });
            }
        }
        sql.push_str(" ORDER BY seq");

        self.query_records(&sql, args)
    }

    fn load_many(&self, owner_type: &OwnerType, owner_ids: &[OwnerId]) -> Result<Vec<MetaRecord>> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "{SELECT_COLUMNS} WHERE owner_type = ? AND owner_id IN ({}) ORDER BY seq",
            placeholders(owner_ids.len())
        );
        let mut args = vec![text(owner_type.as_str())];
        args.extend(owner_ids.iter().map(|id| text(id.as_str())));
        self.query_records(&sql, args)
    }
}
