use crate::error::Result;
use crate::keys::KeyNormalizer;
use crate::model::Owner;
use crate::store::MetaStore;
use serde_json::Value;
use tracing::info;

/// Delete the owner's records, optionally narrowed by key and exact value.
///
/// With neither filter every record of the owner is removed. Returns true if
/// anything was deleted.
pub fn run<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    key: Option<&str>,
    value: Option<&Value>,
) -> Result<bool> {
    let key = key.map(|k| keys.normalize(k)).transpose()?;
    let removed = store.delete_where(owner, key.as_deref(), value)?;
    Ok(removed > 0)
}

/// Cascade: drop all metadata of an owner that has been deleted.
pub fn owner_deleted<S: MetaStore>(store: &S, owner: &Owner) -> Result<usize> {
    let removed = store.delete_owner(owner)?;
    info!(%owner, removed, "Cascaded owner deletion to metadata");
    Ok(removed)
}
