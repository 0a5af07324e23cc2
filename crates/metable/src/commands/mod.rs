//! # Command Layer
//!
//! The metadata behavior lives here: each submodule implements plain
//! functions over a [`MetaStore`](crate::store::MetaStore), an owner and a
//! [`KeyNormalizer`](crate::keys::KeyNormalizer).
//!
//! ## Role and Responsibilities
//!
//! Commands:
//! - normalize keys before they reach the store
//! - enforce the null policy (a null value deletes, it is never stored)
//! - choose between upsert (`set`) and append (`add`) writes
//! - turn "nothing found" into `None`, `false`, `0` or an empty collection
//!
//! Storage failures are propagated untouched with `?`; commands never retry.
//!
//! ## Testing Strategy
//!
//! Command tests run against `InMemoryStore`; the SQLite store is exercised by
//! the integration tests under `tests/`.
//!
//! ## Command Modules
//!
//! - [`get`]: reads (`all`, `get`, `raw`, `has`, `count`, `by_keys`)
//! - [`set`]: writes (`set`, `set_many`, `add`)
//! - [`delete`]: key/value deletes and owner cascade
//! - [`search`]: cross-owner lookups (`where_meta`, `where_json_meta`)
//! - [`eager`]: batch loading for collections of owners
//! - [`export`]: owner snapshots and replay

use crate::model::MetaRecord;
use serde::Serialize;

pub mod delete;
pub mod eager;
pub mod export;
pub mod get;
pub mod search;
pub mod set;

/// What a single `set` did to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SetOutcome {
    Created { record: MetaRecord },
    Updated { record: MetaRecord },
    Deleted { removed: usize },
}

impl SetOutcome {
    /// The record now holding the value, unless the write was a delete.
    pub fn record(&self) -> Option<&MetaRecord> {
        match self {
            SetOutcome::Created { record } | SetOutcome::Updated { record } => Some(record),
            SetOutcome::Deleted { .. } => None,
        }
    }
}
