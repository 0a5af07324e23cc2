use crate::error::Result;
use crate::keys::KeyNormalizer;
use crate::model::{KeyFilter, Owner};
use crate::store::MetaStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::set;

/// Snapshot of one owner's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaExport {
    pub exported_at: DateTime<Utc>,
    pub owner: Owner,
    pub records: Vec<ExportedMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedMeta {
    pub key: String,
    pub value: Value,
}

/// How imported records meet existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Each key keeps a single record; imported values overwrite.
    #[default]
    Upsert,
    /// Every exported record becomes a new record.
    Append,
}

pub fn export<S: MetaStore>(store: &S, owner: &Owner) -> Result<MetaExport> {
    let records = store
        .find_many(owner, &KeyFilter::all())?
        .into_iter()
        .map(|r| ExportedMeta {
            key: r.key,
            value: r.value,
        })
        .collect();

    Ok(MetaExport {
        exported_at: Utc::now(),
        owner: owner.clone(),
        records,
    })
}

/// Replay `snapshot` onto `target` (defaults to the snapshot's own owner).
/// Returns the number of records written; null values are skipped.
pub fn import<S: MetaStore>(
    store: &S,
    keys: &KeyNormalizer,
    snapshot: &MetaExport,
    target: Option<&Owner>,
    mode: ImportMode,
) -> Result<usize> {
    let owner = target.unwrap_or(&snapshot.owner);
    let mut written = 0;

    for entry in snapshot.records.iter().filter(|e| !e.value.is_null()) {
        match mode {
            ImportMode::Upsert => {
                set::set(store, keys, owner, &entry.key, entry.value.clone())?;
            }
            ImportMode::Append => {
                set::add(store, keys, owner, &entry.key, entry.value.clone())?;
            }
        }
        written += 1;
    }
    Ok(written)
}
