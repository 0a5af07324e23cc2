//! # CLI Layer
//!
//! This module is the only place in the crate that:
//! - Knows about stdout and stderr
//! - Installs the tracing subscriber
//! - Resolves configuration files
//!
//! ## Responsibilities
//!
//! 1. **Context Setup**: load configuration, apply `--db`, open the store
//! 2. **Dispatch**: route each subcommand to the API facade
//! 3. **Output**: print results as pretty JSON

use super::setup::{Cli, Commands, OwnerArgs};
use anyhow::{bail, Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use metable::commands::export::{ImportMode, MetaExport};
use metable::config::MetableConfig;
use metable::store::sqlite::SqliteStore;
use metable::{KeyFilter, MetaSearch, MetableApi, OwnerType};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    debug!(db = %config.sqlite.path.display(), "opening metadata store");
    let api = MetableApi::from_config(&config)
        .with_context(|| format!("cannot open {}", config.sqlite.path.display()))?;

    dispatch(&api, cli.command)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("com", "metable", "metable").map(|dirs| dirs.config_dir().join("metable.toml"))
}

fn load_config(cli: &Cli) -> Result<MetableConfig> {
    let file = match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            Some(path.clone())
        }
        None => default_config_file(),
    };

    let mut config = MetableConfig::load(file.as_deref())?;
    if let Some(db) = &cli.db {
        config.sqlite.path = db.clone();
    }
    Ok(config)
}

fn dispatch(api: &MetableApi<SqliteStore>, command: Commands) -> Result<()> {
    match command {
        Commands::Set { owner, key, value } => {
            let outcome = api.meta(owner.owner()).set_meta(&key, parse_value(&value))?;
            print_json(&outcome)
        }
        Commands::Add { owner, key, value } => {
            let record = api.meta(owner.owner()).add_meta(&key, parse_value(&value))?;
            print_json(&record)
        }
        Commands::Get { owner, key, raw } => {
            let meta = api.meta(owner.owner());
            if raw {
                print_json(&meta.raw_meta(&key)?)
            } else {
                print_json(&meta.get_meta(&key)?)
            }
        }
        Commands::List {
            owner,
            only,
            except,
        } => {
            let filter = KeyFilter {
                only: (!only.is_empty()).then_some(only),
                except,
            };
            print_json(&api.meta(owner.owner()).all_meta(&filter)?)
        }
        Commands::Count { owner, keys } => {
            let meta = api.meta(owner.owner());
            let count = if keys.is_empty() {
                meta.count_meta(None)?
            } else {
                meta.count_meta_keys(&keys)?
            };
            print_json(&count)
        }
        Commands::Delete { owner, key, value } => {
            let value = value.as_deref().map(parse_value);
            let deleted = api
                .meta(owner.owner())
                .delete_meta(key.as_deref(), value.as_ref())?;
            print_json(&json!({ "deleted": deleted }))
        }
        Commands::Search {
            key,
            owner_type,
            value,
            path,
        } => {
            let mut search = MetaSearch::key(key);
            if let Some(owner_type) = owner_type {
                search = search.owner_type(OwnerType::new(owner_type));
            }
            search = match (path, value) {
                (Some(path), value) => search.json_contains(path, value.as_deref().map(parse_value)),
                (None, Some(value)) => search.like(value),
                (None, None) => search,
            };
            print_json(&api.search_owners(&search)?)
        }
        Commands::Purge { owner } => {
            let removed = api.on_owner_deleted(&owner.owner())?;
            print_json(&json!({ "removed": removed }))
        }
        Commands::Export { owner } => print_json(&api.export(&owner.owner())?),
        Commands::Import { file, append, into } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let snapshot: MetaExport = serde_json::from_str(&text)
                .with_context(|| format!("{} is not a metadata export", file.display()))?;
            let target = into.map(|parts| {
                OwnerArgs {
                    owner_type: parts[0].clone(),
                    owner_id: parts[1].clone(),
                }
                .owner()
            });
            let mode = if append {
                ImportMode::Append
            } else {
                ImportMode::Upsert
            };
            let imported = api.import(&snapshot, target.as_ref(), mode)?;
            print_json(&json!({ "imported": imported }))
        }
    }
}

/// JSON if it parses, otherwise the raw text as a string.
fn parse_value(input: &str) -> Value {
    serde_json::from_str(input).unwrap_or_else(|_| Value::String(input.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
