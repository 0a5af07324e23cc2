use clap::{Args, Parser, Subcommand};
use metable::{Owner, OwnerType};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "metable",
    bin_name = "metable",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Inspect and edit key/value metadata attached to entities", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to metable.toml in the user config directory)
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// SQLite database path, overrides the configured one
    #[arg(long, global = true, value_name = "PATH", help_heading = "Options")]
    pub db: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

/// The entity a command operates on.
#[derive(Args, Debug, Clone)]
pub struct OwnerArgs {
    /// Owner type, e.g. post
    #[arg(value_name = "TYPE")]
    pub owner_type: String,

    /// Owner id, e.g. 1
    #[arg(value_name = "ID")]
    pub owner_id: String,
}

impl OwnerArgs {
    pub fn owner(&self) -> Owner {
        Owner::new(OwnerType::new(self.owner_type.clone()), self.owner_id.as_str())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set a key, replacing its value (null deletes)
    #[command(display_order = 1)]
    Set {
        #[command(flatten)]
        owner: OwnerArgs,
        key: String,
        /// JSON value; unparsable input is stored as a string
        value: String,
    },

    /// Append a record, even if the key already exists
    #[command(display_order = 2)]
    Add {
        #[command(flatten)]
        owner: OwnerArgs,
        key: String,
        value: String,
    },

    /// Read the value of a key
    #[command(display_order = 3)]
    Get {
        #[command(flatten)]
        owner: OwnerArgs,
        key: String,

        /// Print the whole record instead of its value
        #[arg(long)]
        raw: bool,
    },

    /// Show all metadata of an owner as a key/value map
    #[command(alias = "ls", display_order = 4)]
    List {
        #[command(flatten)]
        owner: OwnerArgs,

        /// Keep only these keys
        #[arg(long, value_name = "KEY")]
        only: Vec<String>,

        /// Leave out these keys
        #[arg(long, value_name = "KEY")]
        except: Vec<String>,
    },

    /// Count records, optionally restricted to some keys
    #[command(display_order = 5)]
    Count {
        #[command(flatten)]
        owner: OwnerArgs,
        keys: Vec<String>,
    },

    /// Delete records of a key, or every record of the owner
    #[command(alias = "rm", display_order = 6)]
    Delete {
        #[command(flatten)]
        owner: OwnerArgs,
        key: Option<String>,

        /// Only delete records holding this JSON value
        #[arg(long, requires = "key")]
        value: Option<String>,
    },

    /// Find records by key and value
    #[command(display_order = 7)]
    Search {
        #[arg(long)]
        key: String,

        /// Restrict to one owner type
        #[arg(long = "type", value_name = "TYPE")]
        owner_type: Option<String>,

        /// Substring to look for, or JSON needle when --path is given
        #[arg(long)]
        value: Option<String>,

        /// Path inside the stored JSON, e.g. cities or address.city
        #[arg(long)]
        path: Option<String>,
    },

    /// Remove all metadata of a deleted owner
    #[command(display_order = 8)]
    Purge {
        #[command(flatten)]
        owner: OwnerArgs,
    },

    /// Print a JSON snapshot of an owner's metadata
    #[command(display_order = 9)]
    Export {
        #[command(flatten)]
        owner: OwnerArgs,
    },

    /// Load a snapshot written by export
    #[command(display_order = 10)]
    Import {
        file: PathBuf,

        /// Append records instead of replacing values per key
        #[arg(long)]
        append: bool,

        /// Import onto another owner instead of the snapshot's own
        #[arg(long, num_args = 2, value_names = ["TYPE", "ID"])]
        into: Option<Vec<String>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_with_owner() {
        let cli = Cli::parse_from(["metable", "set", "post", "1", "author", "Stephen King"]);
        match cli.command {
            Commands::Set { owner, key, value } => {
                assert_eq!(owner.owner().to_string(), "post#1");
                assert_eq!(key, "author");
                assert_eq!(value, "Stephen King");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["metable", "get", "post", "1", "author", "--db", "x.db", "-v"]);
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert!(cli.verbose);
    }

    #[test]
    fn list_accepts_repeated_filters() {
        let cli = Cli::parse_from([
            "metable", "list", "post", "1", "--only", "a", "--only", "b", "--except", "b",
        ]);
        match cli.command {
            Commands::List { only, except, .. } => {
                assert_eq!(only, vec!["a", "b"]);
                assert_eq!(except, vec!["b"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn delete_value_requires_key() {
        assert!(Cli::try_parse_from(["metable", "delete", "post", "1", "--value", "1"]).is_err());
        assert!(Cli::try_parse_from(["metable", "delete", "post", "1", "tag", "--value", "1"]).is_ok());
    }

    #[test]
    fn search_type_flag() {
        let cli = Cli::parse_from([
            "metable", "search", "--key", "publisher", "--type", "book", "--path", "cities",
            "--value", "Ankara",
        ]);
        match cli.command {
            Commands::Search {
                key,
                owner_type,
                value,
                path,
            } => {
                assert_eq!(key, "publisher");
                assert_eq!(owner_type.as_deref(), Some("book"));
                assert_eq!(value.as_deref(), Some("Ankara"));
                assert_eq!(path.as_deref(), Some("cities"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn import_into_takes_type_and_id() {
        let cli = Cli::parse_from(["metable", "import", "snap.json", "--into", "post", "2"]);
        match cli.command {
            Commands::Import { into, append, .. } => {
                assert_eq!(into, Some(vec!["post".to_string(), "2".to_string()]));
                assert!(!append);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
