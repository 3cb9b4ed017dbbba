//! argograph - relationship graphs for Argo CD Applications, ApplicationSets
//! and AppProjects

use anyhow::Result;
use argograph::cli::{
    ConfigSubcommand, GraphArgs, handle_config_command, handle_graph_command, init_logging,
};
use clap::{Parser, Subcommand};

/// Build relationship graphs for Argo CD delivery entities
#[derive(Parser, Debug)]
#[command(name = "argograph")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging (to stderr)
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Build the graph rooted at an Application, ApplicationSet or AppProject
    Graph(GraphArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    match args.command {
        Command::Graph(graph_args) => handle_graph_command(graph_args).await,
        Command::Config { subcommand } => handle_config_command(subcommand).await,
    }
}
