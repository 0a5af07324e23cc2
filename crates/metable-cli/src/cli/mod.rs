//! # CLI Behavior
//!
//! The CLI is the only place that knows about terminal I/O, exit codes and
//! output formatting. Everything it prints on stdout is JSON so that the
//! output can be piped into other tools.
//!
//! ## Value Arguments
//!
//! Values are parsed as JSON first. Anything that does not parse is taken
//! as a plain string, so `metable set post 1 author Stephen` and
//! `metable set post 1 author '"Stephen"'` store the same value, while
//! `metable set post 1 year 1986` stores a number.
//!
//! ## Configuration
//!
//! Settings come from the environment (`METABLE_*`), then the config file
//! (`--config`, or `metable.toml` in the platform config directory), then
//! defaults. `--db` overrides `sqlite.path` last.
//!
//! ## Module Structure
//!
//! - `setup`: Argument parsing via clap
//! - `commands`: Context setup and per-command dispatch

mod commands;
pub mod setup;

pub use commands::run;
