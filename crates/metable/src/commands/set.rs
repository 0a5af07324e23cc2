use super::SetOutcome;
use crate::error::Result;
use crate::keys::KeyNormalizer;
use crate::model::{KeyFilter, MetaRecord, Owner};
use crate::store::MetaStore;
use serde_json::Value;
use tracing::debug;

/// Upsert `key` for the owner.
///
/// A `Null` value deletes every record under the key. Otherwise the first
/// record for the key is overwritten and later duplicates (left by `add`)
/// are removed, so the key ends up with exactly one record. With no record a
/// new one is created.
pub fn set<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    key: &str,
    value: Value,
) -> Result<SetOutcome> {
    let key = keys.normalize(key)?;

    if value.is_null() {
        let removed = store.delete_where(owner, Some(&key), None)?;
        return Ok(SetOutcome::Deleted { removed });
    }

    let existing = store.find_many(owner, &KeyFilter::only([key.as_str()]))?;
    if let Some((first, duplicates)) = existing.split_first() {
        if store.update(&first.id, value.clone())? {
            for duplicate in duplicates {
                store.delete(&duplicate.id)?;
            }
            if !duplicates.is_empty() {
                debug!(%owner, key = %key, removed = duplicates.len(), "Collapsed duplicate records");
            }
            let mut record = first.clone();
            record.value = value;
            return Ok(SetOutcome::Updated { record });
        }
        // The record vanished between read and update; fall through to insert.
    }

    let record = store.create(owner, &key, value)?;
    Ok(SetOutcome::Created { record })
}

/// Apply [`set`] to each pair in order.
///
/// There is no surrounding transaction: if a pair fails, the error is returned
/// and the pairs before it stay written.
pub fn set_many<S, I, K>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    pairs: I,
) -> Result<Vec<SetOutcome>>
where
    S: MetaStore,
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let mut outcomes = Vec::new();
    for (key, value) in pairs {
        outcomes.push(set(store, keys, owner, key.as_ref(), value)?);
    }
    debug!(%owner, written = outcomes.len(), "Bulk metadata write");
    Ok(outcomes)
}

/// Append a new record even if the key already has one. `Null` is a no-op.
pub fn add<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    key: &str,
    value: Value,
) -> Result<Option<MetaRecord>> {
    let key = keys.normalize(key)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(store.create(owner, &key, value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::get;
    use crate::error::MetaError;
    use crate::model::OwnerType;
    use crate::store::memory::InMemoryStore;
    use serde_json::json;

    const POST: OwnerType = OwnerType::from_static("post");

    fn setup() -> (InMemoryStore, KeyNormalizer, Owner) {
        (InMemoryStore::new(), KeyNormalizer::default(), Owner::new(POST, 1))
    }

    #[test]
    fn set_then_get_returns_value() {
        let (store, keys, post) = setup();
        let outcome = set(&store, &keys, &post, "author", json!("Stephen King")).unwrap();
        assert!(matches!(outcome, SetOutcome::Created { .. }));

        assert_eq!(
            get::get(&store, &keys, &post, "author").unwrap(),
            Some(json!("Stephen King"))
        );
        assert_eq!(get::count(&store, &keys, &post, None).unwrap(), 1);
    }

    #[test]
    fn setting_twice_keeps_one_record() {
        let (store, keys, post) = setup();
        set(&store, &keys, &post, "author", json!("Stephen King")).unwrap();
        let outcome = set(&store, &keys, &post, "author", json!("Stephen King")).unwrap();

        assert!(matches!(outcome, SetOutcome::Updated { .. }));
        assert_eq!(get::count(&store, &keys, &post, Some("author")).unwrap(), 1);
    }

    #[test]
    fn update_replaces_value_in_place() {
        let (store, keys, post) = setup();
        let first = set(&store, &keys, &post, "year", json!(1985)).unwrap();
        let second = set(&store, &keys, &post, "year", json!(1986)).unwrap();

        assert_eq!(first.record().unwrap().id, second.record().unwrap().id);
        assert_eq!(get::get(&store, &keys, &post, "year").unwrap(), Some(json!(1986)));
    }

    #[test]
    fn setting_null_deletes_the_key() {
        let (store, keys, post) = setup();
        set(&store, &keys, &post, "author", json!("Stephen King")).unwrap();
        let outcome = set(&store, &keys, &post, "author", Value::Null).unwrap();

        assert_eq!(outcome, SetOutcome::Deleted { removed: 1 });
        assert!(!get::has(&store, &keys, &post, "author").unwrap());
    }

    #[test]
    fn setting_null_on_absent_key_is_harmless() {
        let (store, keys, post) = setup();
        let outcome = set(&store, &keys, &post, "author", Value::Null).unwrap();
        assert_eq!(outcome, SetOutcome::Deleted { removed: 0 });
        assert!(store.is_empty());
    }

    #[test]
    fn empty_string_is_a_real_value() {
        let (store, keys, post) = setup();
        set(&store, &keys, &post, "subtitle", json!("")).unwrap();
        assert_eq!(get::get(&store, &keys, &post, "subtitle").unwrap(), Some(json!("")));
    }

    #[test]
    fn bulk_set_writes_every_pair() {
        let (store, keys, post) = setup();
        set_many(
            &store,
            &keys,
            &post,
            vec![("author", json!("Stephen King")), ("year", json!(1986))],
        )
        .unwrap();

        assert_eq!(get::count(&store, &keys, &post, None).unwrap(), 2);
        let all = get::all(&store, &keys, &post, &KeyFilter::all()).unwrap();
        assert_eq!(
            serde_json::to_value(all).unwrap(),
            json!({"author": "Stephen King", "year": 1986})
        );
    }

    #[test]
    fn bulk_set_is_not_atomic() {
        let (store, keys, post) = setup();
        let result = set_many(
            &store,
            &keys,
            &post,
            vec![("author", json!("a")), ("!!!", json!("b")), ("year", json!(1))],
        );

        assert!(matches!(result, Err(MetaError::InvalidKey(_))));
        assert!(get::has(&store, &keys, &post, "author").unwrap());
        assert!(!get::has(&store, &keys, &post, "year").unwrap());
    }

    #[test]
    fn add_appends_duplicate_keys() {
        let (store, keys, post) = setup();
        add(&store, &keys, &post, "tag", json!("x")).unwrap();
        add(&store, &keys, &post, "tag", json!("x")).unwrap();
        assert_eq!(get::count(&store, &keys, &post, Some("tag")).unwrap(), 2);
    }

    #[test]
    fn set_after_add_collapses_duplicates() {
        let (store, keys, post) = setup();
        add(&store, &keys, &post, "tag", json!("a")).unwrap();
        add(&store, &keys, &post, "tag", json!("b")).unwrap();
        set(&store, &keys, &post, "tag", json!("c")).unwrap();

        assert_eq!(get::get(&store, &keys, &post, "tag").unwrap(), Some(json!("c")));
        let all = get::all(&store, &keys, &post, &KeyFilter::all()).unwrap();
        assert_eq!(all.get("tag"), Some(&json!("c")));
        assert_eq!(get::count(&store, &keys, &post, None).unwrap(), all.len());
    }

    #[test]
    fn add_null_is_a_no_op() {
        let (store, keys, post) = setup();
        assert_eq!(add(&store, &keys, &post, "tag", Value::Null).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn store_failures_propagate() {
        let (store, keys, post) = setup();
        store.set_simulate_write_error(true);
        let result = set(&store, &keys, &post, "author", json!("x"));
        assert!(matches!(result, Err(MetaError::Store(_))));
    }
}
