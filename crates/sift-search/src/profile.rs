//! Search profiles and the profile store seam.
//!
//! A profile is authored and persisted elsewhere; Sift only reads it. The
//! [`ProfileStore`] trait is how the orchestrator resolves a profile id, and
//! [`InMemoryProfileStore`] is a ready-made implementation for tools and
//! tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sift_core::{Error, Result};

use crate::types::{Analyser, SearchField};

/// The part of a search profile that drives compilation and filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProfileConfig {
    /// Profile identifier.
    #[serde(default)]
    pub profile_id: String,

    /// Logical application whose index the profile searches.
    pub application_id: String,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Weighted, togglable fields.
    #[serde(default, alias = "searchFields")]
    pub fields: Vec<SearchField>,

    /// Matching strategy flags.
    #[serde(default)]
    pub analyser: Analyser,

    /// Engine-side score floor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,

    /// Gap that marks the end of the top result cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_score: Option<f64>,

    /// Results are usable as ranked by the engine; skip relative filtering.
    #[serde(default)]
    pub queryable: bool,
}

impl SearchProfileConfig {
    /// Create a profile with no fields.
    ///
    /// Like a deserialized profile that omits `queryable`, the result is not
    /// queryable, so a configured relative score filters its results.
    pub fn new(profile_id: impl Into<String>, application_id: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            application_id: application_id.into(),
            name: None,
            fields: Vec::new(),
            analyser: Analyser::default(),
            min_score: None,
            relative_score: None,
            queryable: false,
        }
    }

    /// Fields that take part in matching and highlighting.
    pub fn enabled_fields(&self) -> impl Iterator<Item = &SearchField> {
        self.fields.iter().filter(|field| field.enabled)
    }

    /// Check the invariants the compiler relies on.
    pub fn validate(&self) -> Result<()> {
        if self.application_id.trim().is_empty() {
            return Err(Error::validation_field(
                "application_id",
                "application id must not be empty",
            ));
        }

        if let Some(field) = self
            .fields
            .iter()
            .find(|field| !field.boost.is_finite() || field.boost < 0.0)
        {
            return Err(Error::validation_field(
                "fields",
                format!("boost of field '{}' must not be negative", field.name),
            ));
        }

        if self
            .min_score
            .is_some_and(|score| !score.is_finite() || score < 0.0)
        {
            return Err(Error::validation_field(
                "min_score",
                "minimum score must be a finite, non-negative number",
            ));
        }

        if self
            .relative_score
            .is_some_and(|score| !score.is_finite() || score < 0.0)
        {
            return Err(Error::validation_field(
                "relative_score",
                "relative score must be a finite, non-negative number",
            ));
        }

        Ok(())
    }
}

/// Source of profiles by id.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile, failing with [`Error::ProfileNotFound`] if absent.
    async fn get(&self, profile_id: &str) -> Result<SearchProfileConfig>;
}

/// Profile store backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, SearchProfileConfig>>,
}

impl InMemoryProfileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a profile, replacing any profile with the same id.
    pub fn insert(&self, profile: SearchProfileConfig) -> Result<()> {
        profile.validate()?;

        let mut profiles = self
            .profiles
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        profiles.insert(profile.profile_id.clone(), profile);
        Ok(())
    }

    /// Remove a profile, returning it if it was present.
    pub fn remove(&self, profile_id: &str) -> Option<SearchProfileConfig> {
        self.profiles
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(profile_id)
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.profiles
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Returns `true` if no profiles are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, profile_id: &str) -> Result<SearchProfileConfig> {
        self.profiles
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(profile_id)
            .cloned()
            .ok_or_else(|| Error::profile_not_found(profile_id))
    }
}

// ============================================================================
// Tests
// ============================================================================
