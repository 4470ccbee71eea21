//! CLI module for commgraph.
//!
//! Subcommands:
//! - `serve`: Run the HTTP API
//! - `init`: Create schema constraints and indexes
//! - `load`: Load the dataset and run the transformation pipeline
//! - `transform`: Run the transformation pipeline only
//! - `embedding`: Embedding model management

mod embedding;
mod init;
mod load;
mod serve;

use clap::{Parser, Subcommand};

pub use embedding::EmbeddingCommand;

/// commgraph - communication graph service
#[derive(Parser)]
#[command(name = "commgraph")]
#[command(about = "Loads, transforms and serves an investigative communication graph")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Host address to bind to (overrides `server.host`)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides `server.port`)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create schema constraints and indexes
    Init,

    /// Clear the database, load MC3_graph.json and transform it
    Load {
        /// Load the raw dataset without running the pipeline
        #[arg(long)]
        skip_transform: bool,
    },

    /// Run the transformation pipeline on the loaded graph
    Transform,

    /// Embedding model management
    Embedding {
        #[command(subcommand)]
        command: EmbeddingCommand,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Serve { ref host, port } => self.run_serve(host.clone(), port).await,
            Command::Init => self.run_init().await,
            Command::Load { skip_transform } => self.run_load(skip_transform).await,
            Command::Transform => self.run_transform().await,
            Command::Embedding { ref command } => command.run().await,
        }
    }
}
