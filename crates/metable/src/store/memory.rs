use super::MetaStore;
use crate::error::{MetaError, Result};
use crate::json;
use crate::model::{KeyFilter, MetaRecord, MetaSearch, Owner, OwnerId, OwnerType, ValueMatch};
use serde_json::Value;
use std::cell::RefCell;
use uuid::Uuid;

/// In-memory metadata store.
///
/// Uses `RefCell` for interior mutability since the store is single-threaded.
/// This avoids the overhead of a lock while still allowing the `MetaStore`
/// trait to use `&self` for all methods. Records live in one `Vec` so
/// insertion order is preserved.
#[derive(Default)]
pub struct InMemoryStore {
    records: RefCell<Vec<MetaRecord>>,
    simulate_write_error: RefCell<bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Total number of records across all owners.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(MetaError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

fn search_matches(record: &MetaRecord, search: &MetaSearch) -> bool {
    if record.key != search.key {
        return false;
    }
    if let Some(owner_type) = &search.owner_type {
        if &record.owner.owner_type != owner_type {
            return false;
        }
    }
    match &search.value {
        ValueMatch::Any => true,
        ValueMatch::Like(needle) => json::like(&record.value, needle),
        ValueMatch::JsonContains { path, needle } => {
            json::contains_at(&record.value, path, needle.as_ref())
        }
    }
}

impl MetaStore for InMemoryStore {
    fn create(&self, owner: &Owner, key: &str, value: Value) -> Result<MetaRecord> {
        self.check_writable()?;
        let record = MetaRecord::new(owner.clone(), key, value);
        self.records.borrow_mut().push(record.clone());
        Ok(record)
    }

    fn find(&self, owner: &Owner, key: &str) -> Result<Option<MetaRecord>> {
        let records = self.records.borrow();
        Ok(records
            .iter()
            .find(|r| &r.owner == owner && r.key == key)
            .cloned())
    }

    fn find_many(&self, owner: &Owner, filter: &KeyFilter) -> Result<Vec<MetaRecord>> {
        let records = self.records.borrow();
        Ok(records
            .iter()
            .filter(|r| &r.owner == owner && filter.matches(&r.key))
            .cloned()
            .collect())
    }

    fn count(&self, owner: &Owner, filter: &KeyFilter) -> Result<usize> {
        let records = self.records.borrow();
        Ok(records
            .iter()
            .filter(|r| &r.owner == owner && filter.matches(&r.key))
            .count())
    }

    fn update(&self, id: &Uuid, value: Value) -> Result<bool> {
        self.check_writable()?;
        let mut records = self.records.borrow_mut();
        match records.iter_mut().find(|r| &r.id == id) {
            Some(record) => {
                record.value = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: &Uuid) -> Result<bool> {
        self.check_writable()?;
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|r| &r.id != id);
        Ok(records.len() < before)
    }

    fn delete_where(
        &self,
        owner: &Owner,
        key: Option<&str>,
        value: Option<&Value>,
    ) -> Result<usize> {
        self.check_writable()?;
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|r| {
            let hit = &r.owner == owner
                && key.is_none_or(|k| r.key == k)
                && value.is_none_or(|v| &r.value == v);
            !hit
        });
        Ok(before - records.len())
    }

    fn search(&self, search: &MetaSearch) -> Result<Vec<MetaRecord>> {
        let records = self.records.borrow();
        Ok(records
            .iter()
            .filter(|r| search_matches(r, search))
            .cloned()
            .collect())
    }

    fn load_many(&self, owner_type: &OwnerType, owner_ids: &[OwnerId]) -> Result<Vec<MetaRecord>> {
        let records = self.records.borrow();
        Ok(records
            .iter()
            .filter(|r| &r.owner.owner_type == owner_type && owner_ids.contains(&r.owner.owner_id))
            .cloned()
            .collect())
    }
}
