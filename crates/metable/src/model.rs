//! Core data types: owners and metadata records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use uuid::Uuid;

/// Stable identifier for a kind of owning entity (e.g. `"post"`, `"book"`).
///
/// Declared explicitly by each adopting type, never derived from the Rust
/// type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerType(Cow<'static, str>);

impl OwnerType {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one owning entity within its [`OwnerType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

macro_rules! owner_id_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for OwnerId {
            fn from(id: $t) -> Self {
                Self(id.to_string())
            }
        })*
    };
}

owner_id_from_int!(i32, i64, u32, u64, usize);

/// Polymorphic reference to the entity a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    pub owner_type: OwnerType,
    pub owner_id: OwnerId,
}

impl Owner {
    pub fn new(owner_type: OwnerType, owner_id: impl Into<OwnerId>) -> Self {
        Self {
            owner_type,
            owner_id: owner_id.into(),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.owner_type, self.owner_id)
    }
}

/// One persisted key/value pair.
///
/// `value` is never `Value::Null`: writing null deletes instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    pub id: Uuid,
    pub owner: Owner,
    pub key: String,
    pub value: Value,
}

impl MetaRecord {
    pub fn new(owner: Owner, key: impl Into<String>, value: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            key: key.into(),
            value,
        }
    }
}

/// Allow-list / deny-list of keys used by filtered reads.
///
/// An empty filter selects every key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFilter {
    pub only: Option<Vec<String>>,
    pub except: Vec<String>,
}

impl KeyFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            only: Some(keys.into_iter().map(Into::into).collect()),
            except: Vec::new(),
        }
    }

    pub fn except<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            only: None,
            except: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.only.is_none() && self.except.is_empty()
    }

    pub fn matches(&self, key: &str) -> bool {
        if let Some(only) = &self.only {
            if !only.iter().any(|k| k == key) {
                return false;
            }
        }
        !self.except.iter().any(|k| k == key)
    }
}

/// How a search compares the stored value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueMatch {
    /// Any record with the key matches.
    Any,
    /// Substring of the value: decoded text for strings, JSON text otherwise (ASCII case-insensitive).
    Like(String),
    /// JSON containment at `path`; `needle: None` only requires the path to exist.
    JsonContains { path: String, needle: Option<Value> },
}

/// Cross-owner search request.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaSearch {
    pub owner_type: Option<OwnerType>,
    pub key: String,
    pub value: ValueMatch,
}

impl MetaSearch {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            owner_type: None,
            key: key.into(),
            value: ValueMatch::Any,
        }
    }

    pub fn owner_type(mut self, owner_type: OwnerType) -> Self {
        self.owner_type = Some(owner_type);
        self
    }

    pub fn like(mut self, needle: impl Into<String>) -> Self {
        self.value = ValueMatch::Like(needle.into());
        self
    }

    pub fn json_contains(mut self, path: impl Into<String>, needle: Option<Value>) -> Self {
        self.value = ValueMatch::JsonContains {
            path: path.into(),
            needle,
        };
        self
    }
}
