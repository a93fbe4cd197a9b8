//! Search-profile compilation, execution and ranking for Sift.
//!
//! This crate turns a declarative search profile (weighted fields, fuzzy and
//! partial-word flags, score thresholds) into an engine-native query, runs it
//! against a search engine, and post-filters the ranked results.
//!
//! # Features
//!
//! - `engine-elastic` (default): Elasticsearch-compatible REST engine binding
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      sift-search                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SearchService (profile lookup, execute, query preview)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RequestCompiler (profile + query → SearchRequest)          │
//! │  filter (relative-score cliff detection)                    │
//! │  MappingCache (per-index FlattenedSchema, write eviction)   │
//! │  FlattenedSchema (mapping tree → dotted paths)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SearchEngine trait                                         │
//! │  └── ElasticEngine (REST via reqwest)                       │
//! │  ProfileStore trait                                         │
//! │  └── InMemoryProfileStore                                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sift_search::{create_search_engine, InMemoryProfileStore, SearchConfig, SearchService};
//!
//! let config = SearchConfig::load("sift.toml")?;
//! let engine = create_search_engine(&config)?;
//! let profiles = Arc::new(InMemoryProfileStore::new());
//! profiles.insert(serde_json::from_str(&profile_json)?)?;
//!
//! let service = SearchService::from_config(engine, profiles, &config);
//! let results = service.search("p-1", "functional harmony").await?;
//! println!("Found {} results", results.number_of_results());
//! ```

// Core modules (always available)
pub mod backend;
pub mod cache;
pub mod config;
pub mod filter;
pub mod profile;
pub mod query;
pub mod schema;
pub mod service;
pub mod types;

// Feature-gated engine bindings
#[cfg(feature = "engine-elastic")]
pub mod elastic;

mod proptests;

// Re-exports
pub use backend::{create_search_engine, SearchEngine};
pub use cache::{MappingCache, WriteEvent};
pub use config::{ElasticConfig, SearchConfig};
pub use profile::{InMemoryProfileStore, ProfileStore, SearchProfileConfig};
pub use query::{
    index_name, partial_word_index_name, RequestCompiler, SearchRequest,
    PARTIAL_WORD_INDEX_SUFFIX, PLACEHOLDER_QUERY,
};
pub use schema::{
    parse_field_tree, FieldNode, FieldTree, FieldType, FlattenedSchema, DEFAULT_MAX_DEPTH,
};
pub use service::SearchService;
pub use types::{Analyser, SearchField, SearchHit, SearchResult, SearchResults, DEFAULT_BOOST};

#[cfg(feature = "engine-elastic")]
pub use elastic::ElasticEngine;

pub use sift_core::{Error, Result};
