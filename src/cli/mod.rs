pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::FeedType;

#[derive(Parser)]
#[command(name = "unifeed")]
#[command(about = "Detect and parse RSS, Atom and JSON feeds", long_about = None)]
pub struct Cli {
    /// Path to a config file (default: ~/.config/unifeed/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers for batch fetching (overrides the config file)
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the detected feed type
    Detect {
        /// URL or path of the feed
        location: String,
    },
    /// Parse a feed and print its items
    Parse {
        /// URL or path of the feed
        location: String,

        /// Parse as a specific dialect instead of detecting it
        #[arg(short = 't', long = "type", value_enum, default_value_t = ParseMode::Universal)]
        mode: ParseMode,

        /// Order items by publication date, undated first
        #[arg(long)]
        sort: bool,

        /// Print the whole feed as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch and parse several feeds concurrently
    Batch {
        /// URLs or paths of the feeds
        #[arg(required = true)]
        locations: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ParseMode {
    Universal,
    Rss,
    Atom,
    Json,
}

impl ParseMode {
    /// The dialect to force, or `None` to sniff.
    pub fn feed_type(self) -> Option<FeedType> {
        match self {
            ParseMode::Universal => None,
            ParseMode::Rss => Some(FeedType::Rss),
            ParseMode::Atom => Some(FeedType::Atom),
            ParseMode::Json => Some(FeedType::Json),
        }
    }
}
