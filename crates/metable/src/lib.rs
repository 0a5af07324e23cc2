//! # Metable Architecture
//!
//! Metable attaches arbitrary key/value metadata to any entity. An entity
//! opts in by implementing [`Metable`]; from then on it can read, write,
//! append, count, search and delete metadata records that point back at it
//! through a polymorphic `(owner_type, owner_id)` reference.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Capability (metable.rs)                                    │
//! │  - Metable trait adopted by entity types                    │
//! │  - MetaHandle: owner-scoped operations                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns store + key normalizer                              │
//! │  - Type-level search, eager loading, owner cascade          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Key normalization, null policy, upsert vs append         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - MetaStore trait                                          │
//! │  - SqliteStore (production), InMemoryStore (testing)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Semantics in Brief
//!
//! - Absence is never an error: missing keys read as `None`, `false` or `0`.
//! - Writing `null` deletes; a `null` value is never stored.
//! - `set_meta` upserts (one record per key), `add_meta` appends.
//! - Bulk writes are not transactional; storage errors propagate as-is.
//! - Keys are slugified before storage unless disabled in [`config`].
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`metable`]: The `Metable` trait and owner-scoped handles
//! - [`commands`]: Metadata behavior over any store
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Owners, records, filters, search requests
//! - [`keys`]: Key normalization
//! - [`json`]: JSON path lookup and containment
//! - [`config`]: Configuration
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod json;
pub mod keys;
pub mod metable;
pub mod model;
pub mod store;

pub use api::{DeletionObserver, MetableApi};
pub use commands::SetOutcome;
pub use error::{MetaError, Result};
pub use metable::{MetaHandle, Metable, WithMeta};
pub use model::{KeyFilter, MetaRecord, MetaSearch, Owner, OwnerId, OwnerType, ValueMatch};
