use crate::error::Result;
use crate::keys::KeyNormalizer;
use crate::model::{MetaRecord, MetaSearch, Owner, OwnerId, OwnerType, ValueMatch};
use crate::store::MetaStore;
use serde_json::Value;
use std::collections::HashSet;

/// Run a search with its key normalized.
pub fn records<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    search: &MetaSearch,
) -> Result<Vec<MetaRecord>> {
    let search = MetaSearch {
        key: keys.normalize(&search.key)?,
        ..search.clone()
    };
    store.search(&search)
}

/// Distinct owners of the records matching `search`, in first-match order.
pub fn owners_of<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    search: &MetaSearch,
) -> Result<Vec<Owner>> {
    Ok(distinct_owners(records(store, keys, search)?))
}

/// Owners of `records` with repeats dropped, keeping first-seen order.
pub fn distinct_owners<I>(records: I) -> Vec<Owner>
where
    I: IntoIterator<Item = MetaRecord>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .map(|r| r.owner)
        .filter(|owner| seen.insert(owner.clone()))
        .collect()
}

/// Owners of `owner_type` having a record under `key`.
///
/// - no value, no notation: any record under the key matches
/// - value only: substring match on the stored value
/// - notation: JSON containment of `value` at that path
pub fn where_meta<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner_type: &OwnerType,
    key: &str,
    value: Option<&Value>,
    notation: Option<&str>,
) -> Result<Vec<OwnerId>> {
    let matcher = match (value, notation) {
        (value, Some(path)) => ValueMatch::JsonContains {
            path: path.to_string(),
            needle: value.cloned(),
        },
        (Some(value), None) => ValueMatch::Like(like_needle(value)),
        (None, None) => ValueMatch::Any,
    };
    owners(store, keys, owner_type, key, matcher)
}

/// Owners of `owner_type` whose value under `key` contains `value` at `notation`.
/// With no value, anything present at the path matches.
pub fn where_json_meta<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner_type: &OwnerType,
    key: &str,
    notation: &str,
    value: Option<&Value>,
) -> Result<Vec<OwnerId>> {
    let matcher = ValueMatch::JsonContains {
        path: notation.to_string(),
        needle: value.cloned(),
    };
    owners(store, keys, owner_type, key, matcher)
}

fn like_needle(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn owners<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner_type: &OwnerType,
    key: &str,
    value: ValueMatch,
) -> Result<Vec<OwnerId>> {
    let search = MetaSearch {
        owner_type: Some(owner_type.clone()),
        key: key.to_string(),
        value,
    };

    Ok(owners_of(store, keys, &search)?
        .into_iter()
        .map(|owner| owner.owner_id)
        .collect())
}
