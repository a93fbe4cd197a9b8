//! Per-index cache of flattened schemas.
//!
//! Fetching and flattening a mapping costs an engine round trip, so the
//! result is kept per physical index until a write to that index invalidates
//! it. The cache is an injected object shared behind an `Arc`; there is no
//! global state.
//!
//! # Consistency
//!
//! No lock is held while the engine is queried. A reader racing an
//! invalidation may observe either the old or the new schema, and two
//! concurrent misses for the same index may both fetch.
//!
//! Every invalidation bumps a per-index generation. A miss records the
//! generation before fetching and stores its result only if the generation
//! is unchanged afterwards, so a fetch that started before a write never
//! overwrites the eviction that write caused.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use sift_core::Result;

use crate::backend::SearchEngine;
use crate::query::{partial_word_index_name, PARTIAL_WORD_INDEX_SUFFIX};
use crate::schema::{FlattenedSchema, DEFAULT_MAX_DEPTH};

/// A write that changes what an index's mapping may look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteEvent {
    /// A document was uploaded.
    DocumentCreated {
        /// Index written to
        index: String,
    },
    /// A document was replaced or patched.
    DocumentUpdated {
        /// Index written to
        index: String,
    },
    /// Several documents were uploaded at once.
    DocumentsBulkCreated {
        /// Index written to
        index: String,
    },
    /// The index was deleted.
    IndexDeleted {
        /// Index that no longer exists
        index: String,
    },
}

impl WriteEvent {
    /// Index the event applies to.
    pub fn index(&self) -> &str {
        match self {
            WriteEvent::DocumentCreated { index }
            | WriteEvent::DocumentUpdated { index }
            | WriteEvent::DocumentsBulkCreated { index }
            | WriteEvent::IndexDeleted { index } => index,
        }
    }
}

/// Cache of flattened schemas keyed by physical index name.
pub struct MappingCache {
    engine: Arc<dyn SearchEngine>,
    max_depth: usize,
    entries: RwLock<Entries>,
}

#[derive(Default)]
struct Entries {
    schemas: HashMap<String, Arc<FlattenedSchema>>,
    generations: HashMap<String, u64>,
    // Bumped by `clear`, which invalidates every index at once.
    epoch: u64,
}

impl Entries {
    fn generation(&self, index: &str) -> (u64, u64) {
        (
            self.epoch,
            self.generations.get(index).copied().unwrap_or_default(),
        )
    }
}

impl MappingCache {
    /// Create a cache using the default maximum mapping depth.
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self::with_max_depth(engine, DEFAULT_MAX_DEPTH)
    }

    /// Create a cache flattening mappings to `max_depth`.
    pub fn with_max_depth(engine: Arc<dyn SearchEngine>, max_depth: usize) -> Self {
        Self {
            engine,
            max_depth,
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Maximum nesting followed when flattening.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Flattened schema of `index`, fetched and stored on a miss.
    ///
    /// # Errors
    ///
    /// Propagates engine failures unchanged. A missing index surfaces as
    /// `Error::IndexNotFound`; failed fetches store nothing.
    pub async fn get(&self, index: &str) -> Result<Arc<FlattenedSchema>> {
        let generation = {
            let entries = self
                .entries
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(schema) = entries.schemas.get(index) {
                log::trace!("Mapping cache hit for '{index}'");
                return Ok(Arc::clone(schema));
            }
            entries.generation(index)
        };

        log::debug!("Mapping cache miss for '{index}', fetching from engine");
        let mapping = self.engine.fetch_mapping(index).await?;
        let schema = Arc::new(FlattenedSchema::flatten(&mapping, self.max_depth));

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if entries.generation(index) == generation {
            entries
                .schemas
                .insert(index.to_string(), Arc::clone(&schema));
        } else {
            log::debug!("Mapping of '{index}' was invalidated during fetch, not caching it");
        }

        Ok(schema)
    }

    /// Drop the entry for `index`, if any.
    ///
    /// A fetch for `index` already in flight will not store its result.
    pub fn invalidate(&self, index: &str) {
        let removed = {
            let mut entries = self
                .entries
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *entries.generations.entry(index.to_string()).or_default() += 1;
            entries.schemas.remove(index)
        };

        if removed.is_some() {
            log::debug!("Invalidated cached mapping of '{index}'");
        }
    }

    /// React to a write by invalidating the affected entries.
    ///
    /// Writes to an application land in both its standard and its
    /// partial-word index, so an event naming the standard index evicts
    /// both.
    pub fn notify(&self, event: &WriteEvent) {
        let index = event.index();
        self.invalidate(index);
        if !index.ends_with(PARTIAL_WORD_INDEX_SUFFIX) {
            self.invalidate(&partial_word_index_name(index));
        }
    }

    /// Number of cached schemas.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .schemas
            .len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached schema.
    pub fn clear(&self) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.epoch += 1;
        entries.schemas.clear();
    }
}

impl std::fmt::Debug for MappingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingCache")
            .field("engine", &self.engine.name())
            .field("max_depth", &self.max_depth)
            .field("entries", &self.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
