//! Metadata key normalization.
//!
//! Keys are slugified before they reach the store, so `"Publish Date"`,
//! `"publish_date"` and `"publish-date"` all address the same slot:
//!
//! - the opposite separator (`_` when the separator is `-`) becomes the separator
//! - `@` becomes `<sep>at<sep>`
//! - letters are lowercased
//! - anything that is not a letter, digit, whitespace or separator is dropped
//! - runs of whitespace and separators collapse into one separator
//! - leading and trailing separators are trimmed
//!
//! A key that normalizes to nothing is rejected.

use crate::error::{MetaError, Result};

/// Normalizes caller-supplied keys into their stored form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNormalizer {
    enabled: bool,
    separator: char,
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self {
            enabled: true,
            separator: '-',
        }
    }
}

impl KeyNormalizer {
    pub fn new(enabled: bool, separator: char) -> Self {
        Self { enabled, separator }
    }

    /// Keys are stored exactly as given (only empty keys are rejected).
    pub fn verbatim() -> Self {
        Self {
            enabled: false,
            separator: '-',
        }
    }

    pub fn normalize(&self, key: &str) -> Result<String> {
        let normalized = if self.enabled {
            slugify(key, self.separator)
        } else {
            key.to_string()
        };

        if normalized.is_empty() {
            return Err(MetaError::InvalidKey(key.to_string()));
        }
        Ok(normalized)
    }

    pub fn normalize_all<K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<String>> {
        keys.iter().map(|k| self.normalize(k.as_ref())).collect()
    }
}

/// Slugify `input` using `separator` between words.
pub fn slugify(input: &str, separator: char) -> String {
    let flip = if separator == '-' { '_' } else { '-' };
    let mut out = String::with_capacity(input.len());
    let mut pending_sep = false;

    let expanded = input.replace('@', &format!("{separator}at{separator}"));

    for ch in expanded.chars() {
        let ch = if ch == flip { separator } else { ch };

        if ch == separator || ch.is_whitespace() {
            pending_sep = true;
            continue;
        }
        if !ch.is_alphanumeric() {
            continue;
        }

        if pending_sep && !out.is_empty() {
            out.push(separator);
        }
        pending_sep = false;
        out.extend(ch.to_lowercase());
    }

    out
}
