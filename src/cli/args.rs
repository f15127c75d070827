//! CLI argument definitions using clap derive

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Scrapyard - content-addressed build artifact cache
///
/// Stores and restores tarballs of build outputs in a local directory or an
/// S3 bucket, keyed by templates such as `gems-#{Gemfile.lock}`.
#[derive(Parser, Debug)]
#[command(name = "scrapyard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SCRAPYARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// The directory or s3:// prefix the scrapyard is stored in
    #[arg(short, long, global = true, env = "SCRAPYARD_YARD")]
    pub yard: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restore the newest tarball matching the first key that has one
    Search(SearchArgs),

    /// Pack paths into a tarball stored under the first key
    #[command(alias = "dump")]
    Store(StoreArgs),

    /// Delete the tarballs stored under the given keys
    Junk(JunkArgs),

    /// Delete tarballs older than 20 days
    Crush,
}

impl Commands {
    /// Commands that log failures and still exit 0
    pub fn is_best_effort(&self) -> bool {
        matches!(self, Commands::Junk(_) | Commands::Crush)
    }
}

/// Key list shared by search, store and junk
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Keys in order of preference (comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub keys: Vec<String>,
}

/// Paths shared by search and store
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Paths to pack or restore
    #[arg(short, long, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Paths given after `--`
    #[arg(last = true)]
    pub trailing: Vec<PathBuf>,
}

impl PathArgs {
    /// All paths, `-p` values first
    pub fn all(&self) -> Vec<PathBuf> {
        self.paths.iter().chain(&self.trailing).cloned().collect()
    }
}

/// Arguments for the search command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    #[command(flatten)]
    pub keys: KeyArgs,

    #[command(flatten)]
    pub paths: PathArgs,
}

/// Arguments for the store command
#[derive(Parser, Debug)]
pub struct StoreArgs {
    #[command(flatten)]
    pub keys: KeyArgs,

    #[command(flatten)]
    pub paths: PathArgs,
}

/// Arguments for the junk command
#[derive(Parser, Debug)]
pub struct JunkArgs {
    #[command(flatten)]
    pub keys: KeyArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_search() {
        let cli = Cli::parse_from([
            "scrapyard", "search", "-k", "gems-#{Gemfile.lock},gems", "-y", "/tmp/yard", "-p",
            "vendor",
        ]);
        assert_eq!(cli.yard.as_deref(), Some("/tmp/yard"));
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.keys.keys, vec!["gems-#{Gemfile.lock}", "gems"]);
                assert_eq!(args.paths.all(), vec![PathBuf::from("vendor")]);
            }
            _ => panic!("expected Search command"),
        }
    }

    #[test]
    fn cli_parses_trailing_paths() {
        let cli = Cli::parse_from([
            "scrapyard", "store", "-k", "npm", "-p", "a", "b", "--", "c",
        ]);
        match cli.command {
            Commands::Store(args) => {
                assert_eq!(
                    args.paths.all(),
                    vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")]
                );
            }
            _ => panic!("expected Store command"),
        }
    }

    #[test]
    fn cli_dump_is_store() {
        let cli = Cli::parse_from(["scrapyard", "dump", "-k", "npm", "--", "node_modules"]);
        assert!(matches!(cli.command, Commands::Store(_)));
    }

    #[test]
    fn cli_parses_junk() {
        let cli = Cli::parse_from(["scrapyard", "junk", "--keys", "a,b"]);
        match cli.command {
            Commands::Junk(args) => assert_eq!(args.keys.keys, vec!["a", "b"]),
            _ => panic!("expected Junk command"),
        }
    }

    #[test]
    fn cli_parses_crush() {
        let cli = Cli::parse_from(["scrapyard", "crush", "--yard", "s3://bucket/ci/"]);
        assert!(matches!(cli.command, Commands::Crush));
        assert_eq!(cli.yard.as_deref(), Some("s3://bucket/ci/"));
    }

    #[test]
    fn junk_and_crush_are_best_effort() {
        let best_effort = |args: &[&str]| Cli::parse_from(args).command.is_best_effort();
        assert!(best_effort(&["scrapyard", "junk", "-k", "a"]));
        assert!(best_effort(&["scrapyard", "crush"]));
        assert!(!best_effort(&["scrapyard", "search", "-k", "a"]));
        assert!(!best_effort(&["scrapyard", "store", "-k", "a", "-p", "x"]));
    }

    #[test]
    fn cli_requires_keys() {
        assert!(Cli::try_parse_from(["scrapyard", "search"]).is_err());
        assert!(Cli::try_parse_from(["scrapyard", "junk"]).is_err());
    }

    #[test]
    fn cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["scrapyard", "melt"]).is_err());
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["scrapyard", "crush"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["scrapyard", "-v", "crush"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["scrapyard", "-vv", "crush"]);
        assert_eq!(cli.verbose, 2);
    }
}
