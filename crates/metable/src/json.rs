//! JSON path lookup and containment matching.
//!
//! Both stores evaluate value predicates with these functions: the in-memory
//! store calls them directly, the SQLite store registers them as the
//! `meta_json_contains` and `meta_like` SQL functions.
//!
//! Paths use `.` or `->` between segments (`publisher->cities`,
//! `address.city`). A numeric segment indexes into an array.

use serde_json::{Number, Value};

/// Resolve `path` inside `value`. An empty path resolves to `value` itself.
pub fn value_at_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for segment in path.split("->").flat_map(|s| s.split('.')) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// `JSON_CONTAINS` semantics: does `target` contain `candidate`?
///
/// - scalars contain equal scalars
/// - an array contains a scalar or object if any element contains it, and
///   contains an array if it contains every element of that array
/// - an object contains an object if every candidate key is present and contained
pub fn json_contains(target: &Value, candidate: &Value) -> bool {
    match (target, candidate) {
        (Value::Array(items), Value::Array(wanted)) => {
            wanted.iter().all(|w| items.iter().any(|i| json_contains(i, w)))
        }
        (Value::Array(items), other) => items.iter().any(|i| json_contains(i, other)),
        (Value::Object(map), Value::Object(wanted)) => wanted
            .iter()
            .all(|(k, w)| map.get(k).is_some_and(|v| json_contains(v, w))),
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (a, b) => a == b,
    }
}

/// Integers compare exactly; floats by value.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if a.is_f64() || b.is_f64() {
        return a.as_f64() == b.as_f64();
    }
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.as_u64().is_some() && a.as_u64() == b.as_u64(),
    }
}

/// Containment test at `path`. With no needle, only the path must resolve.
pub fn contains_at(value: &Value, path: &str, needle: Option<&Value>) -> bool {
    match (value_at_path(value, path), needle) {
        (Some(Value::Null), None) | (None, _) => false,
        (Some(_), None) => true,
        (Some(found), Some(needle)) => json_contains(found, needle),
    }
}

/// ASCII case-insensitive substring match.
///
/// Strings are matched on their decoded text, other values on their JSON
/// serialization. `%` and `_` in `needle` are ordinary characters.
pub fn like(value: &Value, needle: &str) -> bool {
    let haystack = match value {
        Value::String(s) => s.to_ascii_lowercase(),
        other => other.to_string().to_ascii_lowercase(),
    };
    haystack.contains(&needle.to_ascii_lowercase())
}
