use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "outfit")]
#[command(about = "Weather-aware outfit recommendations grounded in clothing rules", long_about = None)]
pub struct Cli {
    /// Path to config.toml (default: ./.outfit/config.toml, then ~/.outfit/config.toml)
    #[arg(short, long, global = true, env = "OUTFIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Write example configuration and create the rule collection")]
    Init {
        /// Initialize in local directory (./.outfit) instead of global (~/.outfit)
        #[arg(short, long)]
        local: bool,
    },

    #[command(about = "Embed clothing rules into the vector store")]
    Ingest {
        /// Rules file (default: rules_path from config)
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    #[command(about = "Recommend an outfit for the current weather")]
    Recommend {
        /// What you want to know, e.g. "It's chilly today, what should I wear?"
        #[arg(short, long)]
        question: String,

        /// Style preference (default: default_preference from config)
        #[arg(short, long)]
        pref: Option<String>,

        /// City name or weather location ID (default: default_location from config)
        #[arg(short, long)]
        loc: Option<String>,
    },

    #[command(about = "Serve recommendations over HTTP")]
    Serve {
        /// Listen address (default: server.addr from config)
        #[arg(short, long)]
        addr: Option<SocketAddr>,
    },

    #[command(about = "Clear all records in the collection (DANGEROUS operation)")]
    Clear {
        /// Skip confirmation prompt (use with caution)
        #[arg(short, long)]
        force: bool,
    },

    #[command(about = "Show vector store and service status")]
    Status,
}
