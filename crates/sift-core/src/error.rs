//! Error types for sift-core.
//!
//! Every fallible Sift operation returns [`Result`]. The flattener, the
//! request compiler and the relative-score filter are total and never produce
//! an [`Error`]; failures originate only at the engine boundary, in the
//! mapping cache miss path, in profile lookup, and in configuration loading.

use std::path::{Path, PathBuf};

/// Result type alias for Sift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur across the Sift crates.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The search engine could not be reached or answered with a failure.
    #[error("Search engine unavailable: {message}")]
    EngineUnavailable {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The named index does not exist in the search engine.
    #[error("Index not found: {index}")]
    IndexNotFound {
        /// Index name that was requested
        index: String,
    },

    /// Raw query retrieval was requested for a profile that requires
    /// post-filtered execution.
    #[error("Search profile '{profile_id}' is not queryable; use the search endpoint instead")]
    NotQueryable {
        /// Profile that was rejected
        profile_id: String,
    },

    /// No profile is stored under the given id.
    #[error("Search profile not found: {id}")]
    ProfileNotFound {
        /// Profile ID that was not found
        id: String,
    },

    /// A search profile failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error without path context
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a specific file
    #[error("I/O error on {path}: {source}")]
    IoWithPath {
        /// File that could not be read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Malformed engine response or input document
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns whether the caller may retry the failed operation.
    ///
    /// Only transport-level failures are retryable. Sift itself never
    /// retries; the decision belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::EngineUnavailable { .. } => true,
            Error::Io(_) | Error::IoWithPath { .. } => true,
            Error::IndexNotFound { .. } => false,
            Error::NotQueryable { .. } => false,
            Error::ProfileNotFound { .. } => false,
            Error::Validation { .. } => false,
            Error::Config { .. } => false,
            Error::Parse(_) => false,
            Error::Serialization(_) => false,
        }
    }

    /// Returns whether this error should map to a not-found outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::IndexNotFound { .. } | Error::ProfileNotFound { .. }
        )
    }

    /// Creates an engine-unavailable error with a message.
    pub fn engine_unavailable<S: Into<String>>(message: S) -> Self {
        Error::EngineUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an engine-unavailable error with a message and source error.
    pub fn engine_unavailable_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::EngineUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an index-not-found error.
    pub fn index_not_found<S: Into<String>>(index: S) -> Self {
        Error::IndexNotFound {
            index: index.into(),
        }
    }

    /// Creates a not-queryable error.
    pub fn not_queryable<S: Into<String>>(profile_id: S) -> Self {
        Error::NotQueryable {
            profile_id: profile_id.into(),
        }
    }

    /// Creates a profile-not-found error.
    pub fn profile_not_found<S: Into<String>>(id: S) -> Self {
        Error::ProfileNotFound { id: id.into() }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it occurred on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Error::Parse(message.into())
    }
}

// ============================================================================
// Tests
// ============================================================================
