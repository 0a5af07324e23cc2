use crate::error::Result;
use crate::keys::KeyNormalizer;
use crate::model::{KeyFilter, MetaRecord, Owner};
use crate::store::MetaStore;
use serde_json::Value;
use std::collections::BTreeMap;

pub(crate) fn normalize_filter(keys: &KeyNormalizer, filter: &KeyFilter) -> Result<KeyFilter> {
    Ok(KeyFilter {
        only: match &filter.only {
            Some(only) => Some(keys.normalize_all(only)?),
            None => None,
        },
        except: keys.normalize_all(&filter.except)?,
    })
}

/// Key → value for the owner. When a key has several records the first one
/// wins, the same record [`get`] returns.
pub fn all<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    filter: &KeyFilter,
) -> Result<BTreeMap<String, Value>> {
    let mut map = BTreeMap::new();
    for record in by_keys(store, keys, owner, filter)? {
        map.entry(record.key).or_insert(record.value);
    }
    Ok(map)
}

/// Raw records for the owner, in insertion order.
pub fn by_keys<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    filter: &KeyFilter,
) -> Result<Vec<MetaRecord>> {
    let filter = normalize_filter(keys, filter)?;
    store.find_many(owner, &filter)
}

pub fn raw<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    key: &str,
) -> Result<Option<MetaRecord>> {
    let key = keys.normalize(key)?;
    store.find(owner, &key)
}

pub fn get<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    key: &str,
) -> Result<Option<Value>> {
    Ok(raw(store, keys, owner, key)?.map(|r| r.value))
}

/// Count the owner's records, all of them when `key` is `None`.
pub fn count<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    key: Option<&str>,
) -> Result<usize> {
    match key {
        Some(key) => count_keys(store, keys, owner, &[key]),
        None => store.count(owner, &KeyFilter::all()),
    }
}

/// Count the owner's records under any of `wanted`.
pub fn count_keys<S: MetaStore, K: AsRef<str>>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    wanted: &[K],
) -> Result<usize> {
    let filter = KeyFilter {
        only: Some(keys.normalize_all(wanted)?),
        except: Vec::new(),
    };
    store.count(owner, &filter)
}

pub fn has<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    key: &str,
) -> Result<bool> {
    Ok(count_keys(store, keys, owner, &[key])? > 0)
}

/// True if at least one of `wanted` has a record. An empty list is false.
pub fn has_any<S: MetaStore, K: AsRef<str>>(
    store: &S,
    keys: &KeyNormalizer,
    owner: &Owner,
    wanted: &[K],
) -> Result<bool> {
    Ok(count_keys(store, keys, owner, wanted)? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::set;
    use crate::model::OwnerType;
    use crate::store::memory::InMemoryStore;
    use serde_json::json;

    const POST: OwnerType = OwnerType::from_static("post");

    fn setup() -> (InMemoryStore, KeyNormalizer, Owner) {
        (InMemoryStore::new(), KeyNormalizer::default(), Owner::new(POST, 1))
    }

    #[test]
    fn missing_key_is_absent_not_an_error() {
        let (store, keys, post) = setup();
        assert!(!has(&store, &keys, &post, "author").unwrap());
        assert_eq!(get(&store, &keys, &post, "author").unwrap(), None);
        assert_eq!(raw(&store, &keys, &post, "author").unwrap(), None);
        assert_eq!(count(&store, &keys, &post, None).unwrap(), 0);
    }

    #[test]
    fn lookups_are_normalized_like_writes() {
        let (store, keys, post) = setup();
        set::set(&store, &keys, &post, "Publish Date", json!("2020-02-24")).unwrap();

        assert_eq!(
            get(&store, &keys, &post, "publish_date").unwrap(),
            Some(json!("2020-02-24"))
        );
        let record = raw(&store, &keys, &post, "PUBLISH-DATE").unwrap().unwrap();
        assert_eq!(record.key, "publish-date");
    }

    #[test]
    fn all_applies_only_and_except() {
        let (store, keys, post) = setup();
        set::set_many(
            &store,
            &keys,
            &post,
            vec![("a", json!(1)), ("b", json!(2)), ("c", json!(3))],
        )
        .unwrap();

        let only = all(&store, &keys, &post, &KeyFilter::only(["a", "b"])).unwrap();
        assert_eq!(only.keys().collect::<Vec<_>>(), vec!["a", "b"]);

        let except = all(&store, &keys, &post, &KeyFilter::except(["b"])).unwrap();
        assert_eq!(except.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn all_agrees_with_get_for_repeated_key() {
        let (store, keys, post) = setup();
        set::add(&store, &keys, &post, "tag", json!("old")).unwrap();
        set::add(&store, &keys, &post, "tag", json!("new")).unwrap();

        let map = all(&store, &keys, &post, &KeyFilter::all()).unwrap();
        assert_eq!(map.get("tag"), Some(&json!("old")));
        assert_eq!(get(&store, &keys, &post, "tag").unwrap(), Some(json!("old")));
    }

    #[test]
    fn has_any_accepts_several_keys() {
        let (store, keys, post) = setup();
        set::set(&store, &keys, &post, "biography", json!("...")).unwrap();

        assert!(has_any(&store, &keys, &post, &["biography", "publisher"]).unwrap());
        assert!(!has_any(&store, &keys, &post, &["publisher"]).unwrap());
        assert!(!has_any::<_, &str>(&store, &keys, &post, &[]).unwrap());
    }

    #[test]
    fn count_keys_counts_each_matching_record() {
        let (store, keys, post) = setup();
        set::add(&store, &keys, &post, "tag", json!("a")).unwrap();
        set::add(&store, &keys, &post, "tag", json!("b")).unwrap();
        set::set(&store, &keys, &post, "author", json!("x")).unwrap();

        assert_eq!(count(&store, &keys, &post, Some("tag")).unwrap(), 2);
        assert_eq!(count_keys(&store, &keys, &post, &["tag", "author"]).unwrap(), 3);
        assert_eq!(count(&store, &keys, &post, None).unwrap(), 3);
    }
}
