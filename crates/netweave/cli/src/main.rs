use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod project;

use crate::commands::CommandContext;
use anyhow::Result;

/// CLI for G2G constraint propagation over a JSON project file
#[derive(Parser, Debug)]
#[command(name = "netweave", about = "Netweave G2G constraint propagation")]
pub struct Cli {
    /// Path to the project file (JSON)
    #[arg(long, default_value = "project.json")]
    pub project: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands for netweave
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter project file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a channel specification and print its expansion
    Channels {
        /// Channel specification, e.g. "2:8" or "1,3,5"
        spec: String,
    },

    /// Expand an interface layout and synchronize the slot matrix
    Expand {
        /// Interface id to expand
        #[arg(long)]
        interface: String,

        /// Channel specification; empty keeps the population unchanneled
        #[arg(long, default_value = "")]
        spec: String,
    },

    /// Recompile the declared group contexts and apply them to the matrix
    Compile,

    /// List the netclasses a group context resolves to
    Resolve {
        /// Group context id
        #[arg(long)]
        group: String,
    },

    /// Show the project summary and the last pending-process state
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => project::write_starter(&cli.project, force),
        Commands::Channels { spec } => commands::layout::print_channels(&spec),
        Commands::Expand { interface, spec } => {
            let ctx = CommandContext::open(&cli.project).await?;
            commands::layout::expand_layout(&ctx, &interface, &spec).await
        }
        Commands::Compile => {
            let ctx = CommandContext::open(&cli.project).await?;
            commands::compile::run_compile(&ctx).await
        }
        Commands::Resolve { group } => {
            let ctx = CommandContext::open(&cli.project).await?;
            commands::compile::resolve_group(&ctx, &group).await
        }
        Commands::Status => {
            let ctx = CommandContext::open(&cli.project).await?;
            commands::compile::show_status(&ctx).await
        }
    }
}
