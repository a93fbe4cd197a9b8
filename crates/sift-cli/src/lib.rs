//! # sift-cli
//!
//! Command-line tools for Sift:
//! - Inspect an index's flattened schema and searchable fields
//! - Preview the request a profile compiles to
//! - Run a profile against the engine and print ranked results

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
