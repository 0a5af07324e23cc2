//! # The Metable Capability
//!
//! Any entity type becomes metable by naming its [`OwnerType`] and exposing
//! its id:
//!
//! ```
//! use metable::{Metable, MetableApi, OwnerId, OwnerType};
//! use metable::store::memory::InMemoryStore;
//! use serde_json::json;
//!
//! struct Post {
//!     id: u64,
//! }
//!
//! impl Metable for Post {
//!     const OWNER_TYPE: OwnerType = OwnerType::from_static("post");
//!
//!     fn owner_id(&self) -> OwnerId {
//!         self.id.into()
//!     }
//! }
//!
//! let api = MetableApi::new(InMemoryStore::new());
//! let post = Post { id: 1 };
//!
//! post.meta(&api).set_meta("author", json!("Stephen King")).unwrap();
//! assert_eq!(post.meta(&api).get_meta("author").unwrap(), Some(json!("Stephen King")));
//! ```
//!
//! The entity owns no metadata state. [`MetaHandle`] is a short-lived view
//! that issues store queries on demand; [`WithMeta`] carries records that were
//! loaded ahead of time by [`MetableApi::with_meta`](crate::api::MetableApi::with_meta).

use crate::api::MetableApi;
use crate::commands::{self, SetOutcome};
use crate::error::Result;
use crate::keys::KeyNormalizer;
use crate::model::{KeyFilter, MetaRecord, Owner, OwnerId, OwnerType};
use crate::store::MetaStore;
use serde_json::Value;
use std::collections::BTreeMap;

/// An entity that can carry metadata.
pub trait Metable {
    /// Stable type identifier stored alongside every record.
    const OWNER_TYPE: OwnerType;

    fn owner_id(&self) -> OwnerId;

    /// The `(owner_type, owner_id)` pair addressing this entity's records.
    fn identity(&self) -> Owner {
        Owner {
            owner_type: Self::OWNER_TYPE,
            owner_id: self.owner_id(),
        }
    }

    /// Metadata operations scoped to this entity.
    fn meta<'a, S: MetaStore>(&self, api: &'a MetableApi<S>) -> MetaHandle<'a, S> {
        api.meta(self.identity())
    }
}

/// Metadata operations bound to one owner.
pub struct MetaHandle<'a, S: MetaStore> {
    store: &'a S,
    keys: &'a KeyNormalizer,
    owner: Owner,
}

impl<'a, S: MetaStore> MetaHandle<'a, S> {
    pub(crate) fn new(store: &'a S, keys: &'a KeyNormalizer, owner: Owner) -> Self {
        Self { store, keys, owner }
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn all_meta(&self, filter: &KeyFilter) -> Result<BTreeMap<String, Value>> {
        commands::get::all(self.store, self.keys, &self.owner, filter)
    }

    pub fn meta_by_keys(&self, filter: &KeyFilter) -> Result<Vec<MetaRecord>> {
        commands::get::by_keys(self.store, self.keys, &self.owner, filter)
    }

    pub fn has_meta(&self, key: &str) -> Result<bool> {
        commands::get::has(self.store, self.keys, &self.owner, key)
    }

    pub fn has_any_meta<K: AsRef<str>>(&self, keys: &[K]) -> Result<bool> {
        commands::get::has_any(self.store, self.keys, &self.owner, keys)
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<Value>> {
        commands::get::get(self.store, self.keys, &self.owner, key)
    }

    pub fn raw_meta(&self, key: &str) -> Result<Option<MetaRecord>> {
        commands::get::raw(self.store, self.keys, &self.owner, key)
    }

    pub fn set_meta(&self, key: &str, value: Value) -> Result<SetOutcome> {
        commands::set::set(self.store, self.keys, &self.owner, key, value)
    }

    pub fn set_many_meta<I, K>(&self, pairs: I) -> Result<Vec<SetOutcome>>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        commands::set::set_many(self.store, self.keys, &self.owner, pairs)
    }

    pub fn add_meta(&self, key: &str, value: Value) -> Result<Option<MetaRecord>> {
        commands::set::add(self.store, self.keys, &self.owner, key, value)
    }

    pub fn count_meta(&self, key: Option<&str>) -> Result<usize> {
        commands::get::count(self.store, self.keys, &self.owner, key)
    }

    pub fn count_meta_keys<K: AsRef<str>>(&self, keys: &[K]) -> Result<usize> {
        commands::get::count_keys(self.store, self.keys, &self.owner, keys)
    }

    pub fn delete_meta(&self, key: Option<&str>, value: Option<&Value>) -> Result<bool> {
        commands::delete::run(self.store, self.keys, &self.owner, key, value)
    }
}

/// An entity paired with metadata loaded in bulk.
#[derive(Debug)]
pub struct WithMeta<'a, T> {
    pub entity: &'a T,
    pub meta: Vec<MetaRecord>,
}

impl<'a, T> WithMeta<'a, T> {
    pub(crate) fn new(entity: &'a T, meta: Vec<MetaRecord>) -> Self {
        Self { entity, meta }
    }

    /// First loaded value for `key` (already-normalized form).
    pub fn get_meta(&self, key: &str) -> Option<&Value> {
        self.meta.iter().find(|r| r.key == key).map(|r| &r.value)
    }

    /// Key → value; for a repeated key the first record wins, as in [`get_meta`](Self::get_meta).
    pub fn all_meta(&self) -> BTreeMap<&str, &Value> {
        self.meta.iter().rev().map(|r| (r.key.as_str(), &r.value)).collect()
    }
}
