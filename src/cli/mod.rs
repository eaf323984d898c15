//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "zero-search",
    version,
    author = "neur0map",
    about = "Tracker-aware search result ranking with relevance feedback",
    long_about = "zero-search ranks the candidate results retrieved for a query, sinking pages \
                  heavy with trackers or thin on content, stores the ranked results without \
                  duplicates and records relevance feedback against them."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/zero-search/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank a candidate set read from a JSON file
    Rank {
        /// JSON array of candidates (`-` reads stdin)
        input: PathBuf,

        /// Persist the ranked results
        #[arg(short, long)]
        store: bool,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List stored results for a query
    Results {
        /// Query the results were stored under
        query: String,

        /// Maximum number of results to return
        #[arg(short, long)]
        limit: Option<usize>,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Mark a stored result as relevant
    Relevant {
        /// Query the result was stored under
        query: String,

        /// Link of the result
        link: String,

        /// Relevance value to store (defaults to feedback.relevant_value)
        #[arg(long)]
        value: Option<i64>,
    },

    /// Show result store statistics
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration and tracker blacklist
    Init {
        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_relevant() {
        let cli = Cli::try_parse_from([
            "zero-search",
            "relevant",
            "cats",
            "http://a",
            "--value",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Relevant { query, link, value } => {
                assert_eq!(query, "cats");
                assert_eq!(link, "http://a");
                assert_eq!(value, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rank_with_global_flags() {
        let cli = Cli::try_parse_from([
            "zero-search",
            "rank",
            "candidates.json",
            "--store",
            "-v",
            "--config",
            "/tmp/config.toml",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
        assert!(matches!(cli.command, Commands::Rank { store: true, json: false, .. }));
    }
}
