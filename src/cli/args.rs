//! CLI argument definitions using clap
//!
//! Commands:
//! - aerotables query --data <rows.json> [--config <cfg.json>]
//! - aerotables explain --data <rows.json> [--config <cfg.json>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aerotables - server-side table queries over JSON document collections
#[derive(Parser, Debug)]
#[command(name = "aerotables")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Write TRACE events (unsupported features, prepared queries) to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one table request read from stdin and print the response
    Query {
        /// Path to search configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to a JSON array of documents
        #[arg(long)]
        data: PathBuf,
    },

    /// Print the prepared store query for a request without fetching rows
    Explain {
        /// Path to search configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to a JSON array of documents
        #[arg(long)]
        data: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
