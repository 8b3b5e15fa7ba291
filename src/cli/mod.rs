//! CLI definitions using clap derive macros
//!
//! Subcommands:
//! - search: live suggestions for a query
//! - go: resolve a submitted query to a route
//! - index: build the index and list its documents
//! - shell: drive the search widget line by line
//! - config: get or set settings
//! - status: show configuration and table sizes

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// finseek - fuzzy search for the finance blog
#[derive(Parser, Debug)]
#[command(name = "finseek")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ~/.finseek/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show ranked suggestions for a query
    Search {
        /// Search query
        #[arg(value_name = "QUERY")]
        query: String,

        /// Read articles from a JSON file instead of the content API
        #[arg(short, long, value_name = "FILE")]
        articles: Option<PathBuf>,

        /// Output results as JSON (for tool integration)
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Resolve a query the way submitting the search box does
    Go {
        /// Search query
        #[arg(value_name = "QUERY")]
        query: String,

        /// Read articles from a JSON file instead of the content API
        #[arg(short, long, value_name = "FILE")]
        articles: Option<PathBuf>,

        /// Output the navigation as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Build the search index and list its documents
    Index {
        /// Read articles from a JSON file instead of the content API
        #[arg(short, long, value_name = "FILE")]
        articles: Option<PathBuf>,

        /// Output documents as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Interactive search box (type to search, /help for commands)
    Shell {
        /// Read articles from a JSON file instead of the content API
        #[arg(short, long, value_name = "FILE")]
        articles: Option<PathBuf>,
    },

    /// Get or set configuration values
    Config {
        /// Configuration key (e.g., "api_base_url", "ranker.threshold")
        key: String,

        /// Value to set (omit to get current value)
        value: Option<String>,
    },

    /// Show configuration and bundled table sizes
    Status,
}
