mod dispatch;

pub use dispatch::dispatch;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `Strandkeep` - durable recall and consolidation memory for stateless LLM apps.
#[derive(Parser, Debug)]
#[command(name = "strandkeep")]
#[command(version)]
#[command(about = "Recall and consolidation memory service.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.strandkeep/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at DEBUG instead of INFO
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Issue a new API key
    IssueKey,

    /// Create a project owned by an API key
    CreateProject {
        #[arg(long)]
        api_key: String,

        #[arg(long)]
        name: String,
    },

    /// Print a project as JSON
    ShowProject {
        #[arg(long)]
        api_key: String,

        #[arg(long)]
        name: String,
    },
}
