//! Handler functions for the `sift` subcommands.
//!
//! Each handler returns the text to print so it can be exercised without a
//! terminal.

use std::path::Path;
use std::sync::Arc;

use sift_core::{Error, Result};
use sift_search::{
    InMemoryProfileStore, SearchConfig, SearchEngine, SearchProfileConfig, SearchService,
};

/// Read and validate a profile from a JSON file.
///
/// A profile without an id is named after the file stem.
pub fn load_profile(path: &Path) -> Result<SearchProfileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let mut profile: SearchProfileConfig = serde_json::from_str(&content)?;

    if profile.profile_id.is_empty() {
        profile.profile_id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "profile".to_string());
    }

    profile.validate()?;
    Ok(profile)
}

/// Build a service holding the single profile read from `path`.
fn service_for_profile(
    engine: Arc<dyn SearchEngine>,
    config: &SearchConfig,
    path: &Path,
) -> Result<(SearchService, String)> {
    let profile = load_profile(path)?;
    let profile_id = profile.profile_id.clone();

    let store = Arc::new(InMemoryProfileStore::new());
    store.insert(profile)?;

    Ok((SearchService::from_config(engine, store, config), profile_id))
}

/// `sift mapping`: the flattened schema (or searchable fields) as JSON.
pub async fn cmd_mapping(
    engine: Arc<dyn SearchEngine>,
    config: &SearchConfig,
    index: &str,
    searchable: bool,
) -> Result<String> {
    let service = SearchService::from_config(engine, Arc::new(InMemoryProfileStore::new()), config);
    let schema = service.schema(index).await?;

    let output = if searchable {
        serde_json::to_string_pretty(&schema.searchable_fields())?
    } else {
        serde_json::to_string_pretty(schema.as_ref())?
    };
    Ok(output)
}

/// `sift preview`: the compiled request of a queryable profile.
pub async fn cmd_preview(
    engine: Arc<dyn SearchEngine>,
    config: &SearchConfig,
    profile_path: &Path,
    query: Option<&str>,
) -> Result<String> {
    let (service, profile_id) = service_for_profile(engine, config, profile_path)?;

    let request = match query {
        Some(query) => service.query_preview_with(&profile_id, query).await?,
        None => service.query_preview(&profile_id).await?,
    };
    Ok(request.to_string())
}

/// `sift search`: ranked results as pretty JSON.
pub async fn cmd_search(
    engine: Arc<dyn SearchEngine>,
    config: &SearchConfig,
    profile_path: &Path,
    query: &str,
) -> Result<String> {
    let (service, profile_id) = service_for_profile(engine, config, profile_path)?;

    let results = service.search(&profile_id, query).await?;
    log::info!(
        "Profile '{profile_id}' returned {} results",
        results.number_of_results()
    );
    Ok(serde_json::to_string_pretty(&results)?)
}

// ============================================================================
// Tests
// ============================================================================
