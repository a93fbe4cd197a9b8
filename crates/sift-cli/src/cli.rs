//! Argument parsing for the `sift` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sift_search::SearchConfig;

/// Sift - search-profile compilation and execution
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SIFT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Search engine URL (overrides the configuration file)
    #[arg(long, env = "SIFT_ELASTIC_URL", global = true)]
    pub url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Sift subcommands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Print the flattened schema of an index
    Mapping {
        /// Index name
        index: String,

        /// Only list the text fields profiles can match against
        #[arg(long)]
        searchable: bool,
    },

    /// Print the request a profile compiles to
    Preview {
        /// Profile JSON file
        #[arg(short, long)]
        profile: PathBuf,

        /// Query text (defaults to the placeholder)
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Run a profile and print the results
    Search {
        /// Profile JSON file
        #[arg(short, long)]
        profile: PathBuf,

        /// Query text
        query: String,
    },
}

impl Cli {
    /// Resolve the effective configuration.
    ///
    /// Uses the configuration file when one is given, the defaults otherwise,
    /// then applies the `--url` override.
    pub fn load_config(&self) -> sift_core::Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::load(path)?,
            None => SearchConfig::default(),
        };

        if let Some(url) = &self.url {
            config.elastic.url = url.clone();
        }

        Ok(config)
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

// ============================================================================
// Tests
// ============================================================================
