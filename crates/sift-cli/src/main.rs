//! Sift CLI
//!
//! Command-line interface for inspecting index mappings and running search
//! profiles against the search engine.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use sift_cli::commands::{cmd_mapping, cmd_preview, cmd_search};
use sift_cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .init();

    let config = cli.load_config().context("failed to load configuration")?;
    tracing::debug!(?config, "Resolved configuration");

    let engine = sift_search::create_search_engine(&config)?;
    if !engine.is_ready() {
        anyhow::bail!("search engine '{}' is not ready", engine.name());
    }

    let output = match &cli.command {
        Command::Mapping { index, searchable } => {
            cmd_mapping(engine, &config, index, *searchable).await
        }
        Command::Preview { profile, query } => {
            cmd_preview(engine, &config, profile, query.as_deref()).await
        }
        Command::Search { profile, query } => cmd_search(engine, &config, profile, query).await,
    }?;

    println!("{output}");
    Ok(())
}
