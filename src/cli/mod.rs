//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod config;
mod graph;
mod logging;
mod version;

pub use config::{ConfigSubcommand, handle_config_command};
pub use graph::{GraphArgs, OutputFormat, handle_graph_command, render};
pub use logging::init_logging;
pub use version::display_version;

use crate::config::ConfigLoader;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// Relationship graphs for Kubernetes objects
#[derive(Parser, Debug)]
#[command(name = "kubelens")]
#[command(about = "Builds health-annotated relationship graphs of Kubernetes objects", long_about = None)]
pub struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the relationship graph rooted at an object
    Graph(GraphArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

/// Dispatch parsed arguments
pub async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Config { subcommand } => handle_config_command(subcommand),
        Command::Version => {
            display_version();
            Ok(())
        }
        Command::Graph(graph_args) => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;

            if let Some(log_path) = init_logging(args.debug, &config.logger)? {
                eprintln!("Logs written to: {}", log_path.display());
            }
            tracing::debug!("Configuration loaded: {:?}", config);

            handle_graph_command(graph_args, &config).await
        }
    }
}
