//! Search request compilation.
//!
//! Provides [`RequestCompiler`] for turning a profile and a query string into
//! an engine-native [`SearchRequest`]. Compilation is pure and deterministic:
//! the same profile and query always yield the same request.
//!
//! # Request shape
//!
//! ```text
//! POST /{application}[_partial_word]/_search
//! {
//!   "query": {
//!     "bool": {
//!       "must": [],
//!       "should": [
//!         { "multi_match": { "query": "...", "type": "most_fields",
//!                            "fields": ["title^2.0", "body^1.0"], ... } }
//!       ]
//!     }
//!   },
//!   "min_score": 0.5,
//!   "highlight": { "fields": { "body": {}, "title": {} } }
//! }
//! ```
//!
//! The matching clause is always the only `should` entry of a `bool` query
//! with no `must` clauses. Required filters belong next to it as `must`
//! entries, leaving the matching clause untouched.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::profile::SearchProfileConfig;
use crate::types::SearchField;

/// Suffix of the physical index analysed with the sub-word pipeline.
pub const PARTIAL_WORD_INDEX_SUFFIX: &str = "_partial_word";

/// Query text used to preview a profile's request without a user query.
pub const PLACEHOLDER_QUERY: &str = "{{placeholder}}";

/// Fuzziness mode derived from term length by the engine.
const AUTO_FUZZINESS: &str = "AUTO";

/// Rewrite strategy that keeps fuzzy expansions from perturbing scores.
const CONSTANT_SCORE_REWRITE: &str = "constant_score";

/// Name of the physical index holding an application's documents.
pub fn index_name(application_id: &str, partial_word_search: bool) -> String {
    if partial_word_search {
        partial_word_index_name(application_id)
    } else {
        application_id.to_string()
    }
}

/// Name of an application's sub-word index variant.
pub fn partial_word_index_name(application_id: &str) -> String {
    format!("{application_id}{PARTIAL_WORD_INDEX_SUFFIX}")
}

/// A compiled search request: target index plus engine-native body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    #[serde(skip)]
    index: String,

    query: Query,

    #[serde(skip_serializing_if = "Option::is_none")]
    min_score: Option<f64>,

    highlight: Highlight,
}

impl SearchRequest {
    /// Physical index the request targets.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Top-level query clause.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Engine-side score floor, if any.
    pub fn min_score(&self) -> Option<f64> {
        self.min_score
    }

    /// Highlight settings.
    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    /// The request body as JSON.
    pub fn body(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "POST /{}/_search {body}", self.index)
    }
}

/// Query clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Boolean combination of clauses.
    Bool(BoolQuery),
    /// Match a query string across several fields.
    MultiMatch(MultiMatchQuery),
}

/// Boolean query with required and optional clauses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    /// Clauses every hit must match.
    pub must: Vec<Query>,
    /// Clauses that contribute to scoring.
    pub should: Vec<Query>,
}

/// How a multi-field match combines per-field scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Every matching field contributes to the score.
    MostFields,
}

/// Multi-field match clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiMatchQuery {
    /// Raw query text.
    pub query: String,

    /// Score combination.
    #[serde(rename = "type")]
    pub match_type: MatchType,

    /// Boosted field references (`name^boost`).
    pub fields: Vec<String>,

    /// Edit-distance tolerance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<String>,

    /// Count swapped adjacent characters as one edit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy_transpositions: Option<bool>,

    /// Rewrite strategy for fuzzy expansions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy_rewrite: Option<String>,

    /// Leading characters excluded from fuzziness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<u32>,
}

impl MultiMatchQuery {
    fn exact(query: &str, fields: Vec<String>) -> Self {
        Self {
            query: query.to_string(),
            match_type: MatchType::MostFields,
            fields,
            fuzziness: None,
            fuzzy_transpositions: None,
            fuzzy_rewrite: None,
            prefix_length: None,
        }
    }

    fn fault_tolerant(query: &str, fields: Vec<String>) -> Self {
        Self {
            fuzziness: Some(AUTO_FUZZINESS.to_string()),
            fuzzy_transpositions: Some(true),
            fuzzy_rewrite: Some(CONSTANT_SCORE_REWRITE.to_string()),
            prefix_length: Some(0),
            ..Self::exact(query, fields)
        }
    }

    /// Returns `true` if any fuzzy option is set.
    pub fn is_fuzzy(&self) -> bool {
        self.fuzziness.is_some()
            || self.fuzzy_transpositions.is_some()
            || self.fuzzy_rewrite.is_some()
            || self.prefix_length.is_some()
    }
}

/// Highlight settings, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Highlight {
    /// Fields to highlight, each with engine-default fragment settings.
    pub fields: BTreeMap<String, HighlightField>,
}

/// Per-field highlight settings (engine defaults).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HighlightField {}

/// Compiles search profiles into engine requests.
///
/// Stateless: one compiler can be shared across any number of concurrent
/// requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestCompiler;

impl RequestCompiler {
    /// Create a compiler.
    pub fn new() -> Self {
        Self
    }

    /// Compile `profile` for `query_text`.
    pub fn compile(&self, profile: &SearchProfileConfig, query_text: &str) -> SearchRequest {
        let enabled: Vec<&SearchField> = profile.enabled_fields().collect();

        let fields = enabled.iter().map(|field| field.boosted_name()).collect();
        let matching = if profile.analyser.fault_tolerant {
            MultiMatchQuery::fault_tolerant(query_text, fields)
        } else {
            MultiMatchQuery::exact(query_text, fields)
        };

        let highlight = Highlight {
            fields: enabled
                .iter()
                .map(|field| (field.name.clone(), HighlightField::default()))
                .collect(),
        };

        let index = index_name(&profile.application_id, profile.analyser.partial_word_search);
        log::debug!(
            "Compiled profile '{}' for index '{index}' ({} enabled fields, fuzzy={})",
            profile.profile_id,
            enabled.len(),
            profile.analyser.fault_tolerant
        );

        SearchRequest {
            index,
            query: Query::Bool(BoolQuery {
                must: Vec::new(),
                should: vec![Query::MultiMatch(matching)],
            }),
            min_score: profile.min_score,
            highlight,
        }
    }
}

/// Compile `profile` for `query_text` with a default compiler.
pub fn compile(profile: &SearchProfileConfig, query_text: &str) -> SearchRequest {
    RequestCompiler::new().compile(profile, query_text)
}

// ============================================================================
// Tests
// ============================================================================
