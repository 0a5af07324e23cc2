//! # Configuration
//!
//! Metable configuration is declared with [`confique`], which handles layered
//! loading from TOML files, environment variables and compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `METABLE_NORMALIZE_KEYS`, `METABLE_SQLITE_PATH`, etc.
//! 2. **Config file**: a `metable.toml` passed to [`MetableConfig::load`].
//! 3. **Compiled Defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `normalize_keys` | `true` | Slugify keys before storing and looking them up |
//! | `key_separator` | `"-"` | Word separator used by the slugifier |
//! | `sqlite.path` | `metable.db` | Database file, or `:memory:` |
//! | `sqlite.wal_mode` | `true` | Use the write-ahead log journal |
//! | `sqlite.busy_timeout_ms` | `5000` | How long to wait on a locked database |

use crate::error::{MetaError, Result};
use crate::keys::KeyNormalizer;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MetableConfig {
    /// Slugify keys before they reach the store.
    #[config(default = true, env = "METABLE_NORMALIZE_KEYS")]
    pub normalize_keys: bool,

    /// Separator placed between words of a slugified key.
    #[config(default = "-", env = "METABLE_KEY_SEPARATOR")]
    pub key_separator: String,

    #[config(nested)]
    pub sqlite: SqliteConfig,
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Database file. `:memory:` opens a private in-memory database.
    #[config(default = "metable.db", env = "METABLE_SQLITE_PATH")]
    pub path: PathBuf,

    #[config(default = true, env = "METABLE_SQLITE_WAL_MODE")]
    pub wal_mode: bool,

    #[config(default = 5000, env = "METABLE_SQLITE_BUSY_TIMEOUT_MS")]
    pub busy_timeout_ms: u32,
}

impl Default for MetableConfig {
    fn default() -> Self {
        Self {
            normalize_keys: true,
            key_separator: "-".to_string(),
            sqlite: SqliteConfig::default(),
        }
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("metable.db"),
            wal_mode: true,
            busy_timeout_ms: 5000,
        }
    }
}

impl SqliteConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            wal_mode: false,
            ..Default::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }
}

impl MetableConfig {
    /// Load from the environment, then `file` (if it exists), then defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        Ok(builder.load()?)
    }

    /// Build the key normalizer described by this configuration.
    pub fn key_normalizer(&self) -> Result<KeyNormalizer> {
        let mut chars = self.key_separator.chars();
        match (chars.next(), chars.next()) {
            (Some(sep), None) => Ok(KeyNormalizer::new(self.normalize_keys, sep)),
            _ => Err(MetaError::InvalidConfig(format!(
                "key_separator must be a single character, got {:?}",
                self.key_separator
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetableConfig::default();
        assert!(config.normalize_keys);
        assert_eq!(config.key_separator, "-");
        assert_eq!(config.sqlite.path, PathBuf::from("metable.db"));
        assert_eq!(config.sqlite.busy_timeout_ms, 5000);
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let config = MetableConfig {
            normalize_keys: false,
            key_separator: "_".to_string(),
            sqlite: SqliteConfig::new("/tmp/meta.db"),
        };
        let text = toml::to_string(&config).unwrap();
        let loaded: MetableConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metable.toml");
        std::fs::write(
            &path,
            "key_separator = \"_\"\n\n[sqlite]\npath = \"data/meta.db\"\n",
        )
        .unwrap();

        let config = MetableConfig::load(Some(&path)).unwrap();
        assert_eq!(config.key_separator, "_");
        assert_eq!(config.sqlite.path, PathBuf::from("data/meta.db"));
        assert!(config.sqlite.wal_mode);
    }

    #[test]
    fn test_multi_char_separator_is_rejected() {
        let config = MetableConfig {
            key_separator: "--".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.key_normalizer(),
            Err(MetaError::InvalidConfig(msg)) if msg.contains("key_separator")
        ));
    }

    #[test]
    fn test_memory_config_detection() {
        assert!(SqliteConfig::memory().is_memory());
        assert!(!SqliteConfig::default().is_memory());
    }
}
