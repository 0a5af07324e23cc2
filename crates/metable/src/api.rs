//! # API Facade
//!
//! [`MetableApi`] is the single entry point for metadata operations,
//! regardless of which client (library caller, CLI) is driving it.
//!
//! It owns the store and the key normalizer, hands out owner-scoped
//! [`MetaHandle`]s, and carries the type-level operations that act on many
//! owners at once (`with_meta`, `where_meta`, `where_json_meta`).
//!
//! ## Generic Over MetaStore
//!
//! - Production: `MetableApi<SqliteStore>`
//! - Testing: `MetableApi<InMemoryStore>`
//!
//! ## Owner Deletion
//!
//! Metadata has no lifecycle of its own. Whatever deletes an owner must tell
//! the API afterwards, either directly through
//! [`MetableApi::on_owner_deleted`] or through a registered
//! [`DeletionObserver`].

use crate::commands::{self, export::ImportMode, export::MetaExport};
use crate::config::MetableConfig;
use crate::error::Result;
use crate::keys::KeyNormalizer;
use crate::metable::{MetaHandle, Metable, WithMeta};
use crate::model::{MetaRecord, MetaSearch, Owner, OwnerId, OwnerType};
use crate::store::sqlite::SqliteStore;
use crate::store::MetaStore;
use serde_json::Value;

/// Hook the entity layer calls after an owner has been deleted.
pub trait DeletionObserver {
    fn owner_deleted(&self, owner: &Owner) -> Result<()>;
}

pub struct MetableApi<S: MetaStore> {
    store: S,
    keys: KeyNormalizer,
}

impl<S: MetaStore> MetableApi<S> {
    /// API with default key normalization (slugified, `-` separator).
    pub fn new(store: S) -> Self {
        Self::with_normalizer(store, KeyNormalizer::default())
    }

    pub fn with_normalizer(store: S, keys: KeyNormalizer) -> Self {
        Self { store, keys }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn normalizer(&self) -> &KeyNormalizer {
        &self.keys
    }

    /// Operations scoped to one owner.
    pub fn meta(&self, owner: Owner) -> MetaHandle<'_, S> {
        MetaHandle::new(&self.store, &self.keys, owner)
    }

    /// Pair each entity with its metadata, loaded in a single query.
    pub fn with_meta<'a, T: Metable>(&self, entities: &'a [T]) -> Result<Vec<WithMeta<'a, T>>> {
        commands::eager::with_meta(&self.store, entities)
    }

    /// Ids of `T` entities having metadata under `key`, optionally matching
    /// `value` (substring, or JSON containment at `notation`).
    pub fn where_meta<T: Metable>(
        &self,
        key: &str,
        value: Option<&Value>,
        notation: Option<&str>,
    ) -> Result<Vec<OwnerId>> {
        self.where_meta_for(&T::OWNER_TYPE, key, value, notation)
    }

    /// Untyped form of [`where_meta`](Self::where_meta).
    pub fn where_meta_for(
        &self,
        owner_type: &OwnerType,
        key: &str,
        value: Option<&Value>,
        notation: Option<&str>,
    ) -> Result<Vec<OwnerId>> {
        commands::search::where_meta(&self.store, &self.keys, owner_type, key, value, notation)
    }

    pub fn where_json_meta<T: Metable>(
        &self,
        key: &str,
        notation: &str,
        value: Option<&Value>,
    ) -> Result<Vec<OwnerId>> {
        commands::search::where_json_meta(
            &self.store,
            &self.keys,
            &T::OWNER_TYPE,
            key,
            notation,
            value,
        )
    }

    /// Records of any owner type matching `search`.
    pub fn search(&self, search: &MetaSearch) -> Result<Vec<MetaRecord>> {
        commands::search::records(&self.store, &self.keys, search)
    }

    /// Distinct owners of the records matching `search`, in first-match order.
    pub fn search_owners(&self, search: &MetaSearch) -> Result<Vec<Owner>> {
        commands::search::owners_of(&self.store, &self.keys, search)
    }

    /// Cascade an owner's deletion to its metadata. Returns records removed.
    pub fn on_owner_deleted(&self, owner: &Owner) -> Result<usize> {
        commands::delete::owner_deleted(&self.store, owner)
    }

    pub fn export(&self, owner: &Owner) -> Result<MetaExport> {
        commands::export::export(&self.store, owner)
    }

    pub fn import(
        &self,
        snapshot: &MetaExport,
        target: Option<&Owner>,
        mode: ImportMode,
    ) -> Result<usize> {
        commands::export::import(&self.store, &self.keys, snapshot, target, mode)
    }
}

impl MetableApi<SqliteStore> {
    /// Open the SQLite store and key policy described by `config`.
    pub fn from_config(config: &MetableConfig) -> Result<Self> {
        let store = SqliteStore::open(config.sqlite.clone())?;
        Ok(Self::with_normalizer(store, config.key_normalizer()?))
    }
}

impl<S: MetaStore> DeletionObserver for MetableApi<S> {
    fn owner_deleted(&self, owner: &Owner) -> Result<()> {
        self.on_owner_deleted(owner).map(|_| ())
    }
}
