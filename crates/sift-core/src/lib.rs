//! Sift Core: shared error taxonomy for the Sift crates.
//!
//! This crate has no internal Sift dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias

pub mod error;

pub use error::{Error, Result};
