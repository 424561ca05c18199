pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gazette")]
#[command(about = "Categorized news feeds from a headless content store", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/gazette/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured views
    Views,
    /// Show the feed for one category
    Feed {
        /// Category tag, e.g. "sports"
        category: String,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show every configured view
    Front {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single article
    Show {
        /// Document id
        id: String,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
}
