use std::path::PathBuf;

use bookshelf_types::ReadingStatus;

#[derive(clap::Parser, Debug)]
#[clap(name = "bookshelf", about = "Track your reading from the terminal")]
pub struct Cli {
    /// Log debug output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default one
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List the books in your library
    Library {
        /// Only show readings with this status
        #[clap(long)]
        status: Option<ReadingStatus>,
    },
    /// Search the catalogue
    Search {
        /// Search query
        query: String,
        /// Maximum number of results
        #[clap(long, default_value_t = 10)]
        limit: u32,
    },
    /// Add a book to your library
    Add {
        #[clap(long)]
        title: String,
        #[clap(long)]
        author: String,
        #[clap(long)]
        isbn: Option<String>,
        /// Reading status (defaults to sync.default_status)
        #[clap(long)]
        status: Option<ReadingStatus>,
    },
    /// Change the status of a reading
    Status {
        reading_id: i64,
        status: ReadingStatus,
    },
    /// Remove a reading from your library
    Remove { reading_id: i64 },
    /// Browse and act on recommendations
    Recommendations {
        #[clap(subcommand)]
        command: RecommendationCommands,
    },
    /// Show the social feed
    Feed {
        /// Number of pages to load
        #[clap(long, default_value_t = 1)]
        pages: u32,
        /// Show every member of grouped activities
        #[clap(long)]
        expand: bool,
    },
    /// Follow a user
    Follow { user_id: i64 },
    /// Stop following a user
    Unfollow { user_id: i64 },
    /// Manage configuration
    Config {
        #[clap(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum RecommendationCommands {
    /// List current recommendations
    List,
    /// Add a recommended book to your library
    Accept {
        id: i64,
        /// Reading status (defaults to sync.default_status)
        #[clap(long)]
        status: Option<ReadingStatus>,
    },
    /// Dismiss a recommendation
    Dismiss { id: i64 },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set { key: String, value: String },
    /// Get a configuration value
    Get { key: String },
    /// Show all configuration
    Show,
    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[clap(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_statuses() {
        let cli = Cli::parse_from(["bookshelf", "library", "--status", "currently_reading"]);
        match cli.command {
            Commands::Library { status } => {
                assert_eq!(status, Some(ReadingStatus::CurrentlyReading))
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["bookshelf", "status", "3", "abandoned"]).is_err());
    }

    #[test]
    fn accept_takes_an_optional_status() {
        let cli = Cli::parse_from([
            "bookshelf",
            "recommendations",
            "accept",
            "7",
            "--status",
            "finished",
        ]);
        match cli.command {
            Commands::Recommendations {
                command: RecommendationCommands::Accept { id, status },
            } => {
                assert_eq!(id, 7);
                assert_eq!(status, Some(ReadingStatus::Finished));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["bookshelf", "feed", "--pages", "3", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Feed { pages: 3, expand: false }));
    }
}
