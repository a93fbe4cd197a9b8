//! Configuration for Sift search.
//!
//! ```toml
//! max_mapping_depth = 5
//! placeholder_query = "{{placeholder}}"
//!
//! [elastic]
//! url = "http://localhost:9200"
//! username = "elastic"
//! password = "changeme"
//! timeout_secs = 30
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above
//! (credentials default to none).

use std::path::Path;

use serde::{Deserialize, Serialize};
use sift_core::{Error, Result};

use crate::query::PLACEHOLDER_QUERY;
use crate::schema::DEFAULT_MAX_DEPTH;

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum object nesting followed when flattening mappings.
    #[serde(default = "default_max_mapping_depth")]
    pub max_mapping_depth: usize,

    /// Query text used by query previews.
    #[serde(default = "default_placeholder_query")]
    pub placeholder_query: String,

    /// Engine connection settings.
    #[serde(default)]
    pub elastic: ElasticConfig,
}

/// Connection settings for an Elasticsearch-compatible engine.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticConfig {
    /// Base URL of the engine's REST API.
    #[serde(default = "default_url")]
    pub url: String,

    /// Basic-auth user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Basic-auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_mapping_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_placeholder_query() -> String {
    PLACEHOLDER_QUERY.to_string()
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_mapping_depth: default_max_mapping_depth(),
            placeholder_query: default_placeholder_query(),
            elastic: ElasticConfig::default(),
        }
    }
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for ElasticConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SearchConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::IoWithPath` if the file cannot be read and
    /// `Error::Config` if it is not valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))?;

        log::debug!("Loaded search configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
