//! Search engine trait and factory.
//!
//! This module defines the `SearchEngine` trait that every engine binding
//! must satisfy. The engine is the only component that performs I/O: it
//! reports index mappings and executes compiled requests.
//!
//! # Engines
//!
//! - `ElasticEngine`: Elasticsearch-compatible REST API (requires
//!   `engine-elastic` feature)
//!
//! # Example
//!
//! ```rust,ignore
//! use sift_search::{create_search_engine, SearchConfig};
//!
//! let config = SearchConfig::default();
//! let engine = create_search_engine(&config)?;
//!
//! let mapping = engine.fetch_mapping("5d2a").await?;
//! println!("{} top-level fields", mapping.len());
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use sift_core::Result;

use crate::config::SearchConfig;
use crate::query::SearchRequest;
use crate::schema::FieldTree;
use crate::types::SearchHit;

/// Abstract search engine binding.
///
/// # Errors
///
/// Implementations report a missing index as `Error::IndexNotFound` and
/// every transport or server failure as `Error::EngineUnavailable`. They
/// never retry internally.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Fetch the field mapping of `index`.
    async fn fetch_mapping(&self, index: &str) -> Result<FieldTree>;

    /// Execute a compiled request.
    ///
    /// Returns hits ordered by descending score.
    async fn execute(&self, request: &SearchRequest) -> Result<Vec<SearchHit>>;

    /// Get the engine name for diagnostics.
    fn name(&self) -> &str;

    /// Check if the engine is ready to handle requests.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Create the search engine selected by the compiled features.
///
/// # Errors
///
/// Returns a configuration error if the engine cannot be initialized or if
/// no engine binding was compiled in.
pub fn create_search_engine(config: &SearchConfig) -> Result<Arc<dyn SearchEngine>> {
    create_engine(config)
}

#[cfg(feature = "engine-elastic")]
fn create_engine(config: &SearchConfig) -> Result<Arc<dyn SearchEngine>> {
    let engine = crate::elastic::ElasticEngine::new(&config.elastic)?;
    log::info!(
        "Using search engine '{}' at {}",
        engine.name(),
        config.elastic.url
    );
    Ok(Arc::new(engine))
}

#[cfg(not(feature = "engine-elastic"))]
fn create_engine(_config: &SearchConfig) -> Result<Arc<dyn SearchEngine>> {
    Err(sift_core::Error::config(
        "no search engine available; enable the `engine-elastic` feature",
    ))
}

// ============================================================================
// Tests
// ============================================================================
