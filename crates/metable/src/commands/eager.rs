use crate::error::Result;
use crate::metable::{Metable, WithMeta};
use crate::model::{MetaRecord, OwnerId};
use crate::store::MetaStore;
use std::collections::HashMap;

/// Load the metadata of every entity in one store query.
///
/// Entities keep their order; each is paired with its records in insertion order.
pub fn with_meta<'a, S: MetaStore, T: Metable>(
    store: &S,
    entities: &'a [T],
) -> Result<Vec<WithMeta<'a, T>>> {
    let ids: Vec<OwnerId> = entities.iter().map(Metable::owner_id).collect();
    let mut grouped: HashMap<OwnerId, Vec<MetaRecord>> = HashMap::new();
    for record in store.load_many(&T::OWNER_TYPE, &ids)? {
        grouped
            .entry(record.owner.owner_id.clone())
            .or_default()
            .push(record);
    }

    Ok(entities
        .iter()
        .map(|entity| {
            let meta = grouped.get(&entity.owner_id()).cloned().unwrap_or_default();
            WithMeta::new(entity, meta)
        })
        .collect())
}
