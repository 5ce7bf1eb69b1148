//! CLI module for aerotables
//!
//! Provides command-line interface for:
//! - query: One-shot table request over a JSON document file
//! - explain: One-shot plan rendering for a table request

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    explain, explain_plan, load_collection, load_config, query, query_response, run, run_command,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_json};
