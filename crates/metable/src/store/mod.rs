//! # Storage Layer
//!
//! The [`MetaStore`] trait is the persistence contract every metadata
//! operation is written against. It knows nothing about key normalization,
//! null handling or upsert rules; those live in the command layer.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryStore`]: `RefCell`-backed, for tests and embedding.
//! - [`sqlite::SqliteStore`]: durable storage on a single SQLite connection.
//!
//! ## Record Order
//!
//! Stores return records in insertion order. "The first record for a key"
//! is therefore the earliest one written: `find` returns it, and an upsert
//! overwrites it and deletes any later duplicates.
//!
//! ## Storage Layout (SQLite)
//!
//! ```text
//! meta(seq, id, owner_type, owner_id, key, value)
//!      └── index (owner_type, owner_id, key)
//! ```
//!
//! `value` holds the JSON text of the record's value.

use crate::error::Result;
use crate::model::{KeyFilter, MetaRecord, MetaSearch, Owner, OwnerId, OwnerType};
use serde_json::Value;
use uuid::Uuid;

pub mod connection;
pub mod memory;
pub mod schema;
pub mod sqlite;

/// Abstract interface for metadata persistence.
///
/// All methods take `&self`; implementations handle their own interior
/// mutability. Keys arrive already normalized.
pub trait MetaStore {
    /// Insert a new record.
    fn create(&self, owner: &Owner, key: &str, value: Value) -> Result<MetaRecord>;

    /// First record for `key`, if any.
    fn find(&self, owner: &Owner, key: &str) -> Result<Option<MetaRecord>>;

    /// All of the owner's records whose key passes `filter`.
    fn find_many(&self, owner: &Owner, filter: &KeyFilter) -> Result<Vec<MetaRecord>>;

    /// Number of the owner's records whose key passes `filter`.
    fn count(&self, owner: &Owner, filter: &KeyFilter) -> Result<usize>;

    /// Overwrite the value of record `id`. Returns false if it no longer exists.
    fn update(&self, id: &Uuid, value: Value) -> Result<bool>;

    /// Delete record `id`. Returns false if it no longer exists.
    fn delete(&self, id: &Uuid) -> Result<bool>;

    /// Delete the owner's records, optionally narrowed by key and exact value.
    fn delete_where(&self, owner: &Owner, key: Option<&str>, value: Option<&Value>)
        -> Result<usize>;

    /// Records of any owner matching `search`.
    fn search(&self, search: &MetaSearch) -> Result<Vec<MetaRecord>>;

    /// All records for several owners of one type, in one round trip.
    fn load_many(&self, owner_type: &OwnerType, owner_ids: &[OwnerId]) -> Result<Vec<MetaRecord>>;

    /// Remove everything the owner has.
    fn delete_owner(&self, owner: &Owner) -> Result<usize> {
        self.delete_where(owner, None, None)
    }
}
