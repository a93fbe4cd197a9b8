//! Common types shared by the compiler, the engine backends and the filter.
//!
//! These types are always available regardless of feature flags.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One indexable field's participation in matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchField {
    /// Dotted field path, as produced by the schema flattener.
    pub name: String,

    /// Disabled fields take no part in matching or highlighting.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Relevance weight (never negative).
    #[serde(default = "default_boost")]
    pub boost: f64,
}

/// Boost assigned to fields of a freshly created profile.
pub const DEFAULT_BOOST: f64 = 1.0;

fn default_enabled() -> bool {
    true
}

fn default_boost() -> f64 {
    DEFAULT_BOOST
}

impl SearchField {
    /// Create a field entry.
    pub fn new(name: impl Into<String>, enabled: bool, boost: f64) -> Self {
        Self {
            name: name.into(),
            enabled,
            boost,
        }
    }

    /// Create an enabled field with the default boost.
    pub fn enabled(name: impl Into<String>) -> Self {
        Self::new(name, true, DEFAULT_BOOST)
    }

    /// Render the field as a boosted field reference (`name^boost`).
    ///
    /// The boost always carries a fractional part, so `1` renders as `1.0`.
    pub fn boosted_name(&self) -> String {
        format!("{}^{:?}", self.name, self.boost)
    }
}

/// Tuning flags selecting the matching strategy and the physical index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analyser {
    /// Tolerate small spelling variations via edit distance.
    #[serde(default)]
    pub fault_tolerant: bool,

    /// Query the sub-word (decompounding) index variant.
    #[serde(default)]
    pub partial_word_search: bool,
}

/// A raw ranked hit as returned by a search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Engine relevance score.
    pub score: f64,

    /// Stored document source.
    pub document: serde_json::Value,

    /// Highlight fragments per field.
    #[serde(default)]
    pub highlights: HashMap<String, Vec<String>>,
}

/// A single matched document in a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Relevance score (higher is better).
    pub score: f64,

    /// The matched document, passed through opaquely.
    pub document: serde_json::Value,

    /// Highlight fragments per field.
    #[serde(default)]
    pub highlights: HashMap<String, Vec<String>>,
}

impl From<SearchHit> for SearchResult {
    fn from(hit: SearchHit) -> Self {
        Self {
            score: hit.score,
            document: hit.document,
            highlights: hit.highlights,
        }
    }
}

/// Collection of search results, ordered by descending score.
///
/// `number_of_results` always equals `results.len()`; the fields are private
/// so the two cannot drift apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    number_of_results: usize,
    results: Vec<SearchResult>,
}

impl SearchResults {
    /// Create empty results.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build results from engine hits, preserving engine order.
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        hits.into_iter().map(SearchResult::from).collect()
    }

    /// Number of results.
    pub fn number_of_results(&self) -> usize {
        self.number_of_results
    }

    /// Results in ranked order.
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Returns `true` if there are no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Consume and return the ranked results.
    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }

    /// Keep only the results matching `keep`, updating the count.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&SearchResult) -> bool,
    {
        self.results.retain(keep);
        self.number_of_results = self.results.len();
    }
}

impl FromIterator<SearchResult> for SearchResults {
    fn from_iter<I: IntoIterator<Item = SearchResult>>(iter: I) -> Self {
        let results: Vec<SearchResult> = iter.into_iter().collect();
        Self {
            number_of_results: results.len(),
            results,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
