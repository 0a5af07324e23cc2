//! # Metable CLI
//!
//! A thin command-line client over the `metable` library. It opens the
//! SQLite store named by configuration (or `--db`), runs one operation
//! against one owner, and prints the result as JSON on stdout.
//!
//! ## Workspace Structure
//!
//! - `crates/metable/`: the library (capability, API facade, stores)
//! - `crates/metable-cli/`: this binary, depends on the `metable` library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/metable-cli/src/cli/)                    │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - config + logging wiring, dispatch (commands.rs)          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/metable/src/api.rs)                      │
//! │  - Owner-scoped handles, type-level search, cascade         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Owners are addressed by `TYPE ID` pairs on the command line
//! (`metable get post 1 author`), so the CLI works with any entity type
//! without knowing it at compile time.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
