//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod config;
mod graph;
mod logging;

pub use config::{ConfigSubcommand, handle_config_command};
pub use graph::{GraphArgs, OutputFormat, handle_graph_command};
pub use logging::*;
