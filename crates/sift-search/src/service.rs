//! Search orchestration.
//!
//! [`SearchService`] ties the pieces together:
//!
//! ```text
//! profile id ──▶ ProfileStore ──▶ RequestCompiler ──▶ SearchEngine
//!                                                        │
//!                 SearchResults ◀── relative filter ◀────┘
//! ```
//!
//! Profiles marked `queryable` return engine results as ranked. Other
//! profiles pass through the relative-score filter, and their compiled
//! query is not handed out.

use std::sync::Arc;

use sift_core::{Error, Result};

use crate::backend::SearchEngine;
use crate::cache::{MappingCache, WriteEvent};
use crate::config::SearchConfig;
use crate::filter;
use crate::profile::{ProfileStore, SearchProfileConfig};
use crate::query::{RequestCompiler, SearchRequest, PLACEHOLDER_QUERY};
use crate::schema::FlattenedSchema;
use crate::types::{SearchField, SearchResults};

/// Executes searches and query previews for stored profiles.
pub struct SearchService {
    engine: Arc<dyn SearchEngine>,
    profiles: Arc<dyn ProfileStore>,
    mappings: Arc<MappingCache>,
    compiler: RequestCompiler,
    placeholder_query: String,
}

impl SearchService {
    /// Create a service with its own mapping cache.
    pub fn new(engine: Arc<dyn SearchEngine>, profiles: Arc<dyn ProfileStore>) -> Self {
        let mappings = Arc::new(MappingCache::new(Arc::clone(&engine)));
        Self::with_cache(engine, profiles, mappings)
    }

    /// Create a service sharing an existing mapping cache.
    pub fn with_cache(
        engine: Arc<dyn SearchEngine>,
        profiles: Arc<dyn ProfileStore>,
        mappings: Arc<MappingCache>,
    ) -> Self {
        Self {
            engine,
            profiles,
            mappings,
            compiler: RequestCompiler::new(),
            placeholder_query: PLACEHOLDER_QUERY.to_string(),
        }
    }

    /// Create a service configured from `config`.
    pub fn from_config(
        engine: Arc<dyn SearchEngine>,
        profiles: Arc<dyn ProfileStore>,
        config: &SearchConfig,
    ) -> Self {
        let mappings = Arc::new(MappingCache::with_max_depth(
            Arc::clone(&engine),
            config.max_mapping_depth,
        ));
        let mut service = Self::with_cache(engine, profiles, mappings);
        service.placeholder_query = config.placeholder_query.clone();
        service
    }

    /// The shared mapping cache.
    pub fn mappings(&self) -> &Arc<MappingCache> {
        &self.mappings
    }

    /// Search with the stored profile `profile_id`.
    ///
    /// # Errors
    ///
    /// `Error::ProfileNotFound` if no such profile exists; engine failures
    /// are propagated unchanged.
    pub async fn search(&self, profile_id: &str, query_text: &str) -> Result<SearchResults> {
        let profile = self.profiles.get(profile_id).await?;
        self.execute(&profile, query_text).await
    }

    /// Search with `profile`.
    ///
    /// Results of non-queryable profiles with a relative score are cut at the
    /// first score cliff; all other results are returned as ranked.
    pub async fn execute(
        &self,
        profile: &SearchProfileConfig,
        query_text: &str,
    ) -> Result<SearchResults> {
        let request = self.compiler.compile(profile, query_text);
        let hits = self.engine.execute(&request).await?;
        let results = SearchResults::from_hits(hits);

        match profile.relative_score {
            Some(relative_score) if !profile.queryable && !results.is_empty() => {
                Ok(filter::apply(results, relative_score))
            }
            _ => Ok(results),
        }
    }

    /// Compile `profile` without executing it.
    ///
    /// # Errors
    ///
    /// `Error::NotQueryable` if the profile requires post-filtering.
    pub fn compile_only(
        &self,
        profile: &SearchProfileConfig,
        query_text: &str,
    ) -> Result<SearchRequest> {
        if !profile.queryable {
            log::debug!(
                "Refusing query preview of non-queryable profile '{}'",
                profile.profile_id
            );
            return Err(Error::not_queryable(&profile.profile_id));
        }

        Ok(self.compiler.compile(profile, query_text))
    }

    /// The request stored profile `profile_id` compiles to, using the
    /// placeholder query text.
    pub async fn query_preview(&self, profile_id: &str) -> Result<SearchRequest> {
        let profile = self.profiles.get(profile_id).await?;
        self.compile_only(&profile, &self.placeholder_query)
    }

    /// The request stored profile `profile_id` compiles to for `query_text`.
    pub async fn query_preview_with(
        &self,
        profile_id: &str,
        query_text: &str,
    ) -> Result<SearchRequest> {
        let profile = self.profiles.get(profile_id).await?;
        self.compile_only(&profile, query_text)
    }

    /// Flattened schema of an application's standard index.
    pub async fn schema(&self, application_id: &str) -> Result<Arc<FlattenedSchema>> {
        self.mappings.get(application_id).await
    }

    /// Text fields of an application that profiles may match against.
    pub async fn searchable_fields(&self, application_id: &str) -> Result<Vec<String>> {
        let schema = self.schema(application_id).await?;
        Ok(schema.searchable_fields().into_iter().collect())
    }

    /// Field list for a new profile of `application_id`.
    pub async fn default_search_fields(&self, application_id: &str) -> Result<Vec<SearchField>> {
        let schema = self.schema(application_id).await?;
        Ok(schema.default_search_fields())
    }

    /// Forward a write notification to the mapping cache.
    pub fn notify(&self, event: &WriteEvent) {
        self.mappings.notify(event);
    }
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("engine", &self.engine.name())
            .field("mappings", &self.mappings)
            .field("placeholder_query", &self.placeholder_query)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
