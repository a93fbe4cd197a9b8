//! Elasticsearch-compatible engine binding.
//!
//! Talks to the engine's REST API with `reqwest`:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `fetch_mapping` | `GET {url}/{index}/_mapping` |
//! | `execute` | `POST {url}/{index}/_search` |
//!
//! A 404 answer maps to `Error::IndexNotFound`; every other failure,
//! including a response body that cannot be decoded, maps to
//! `Error::EngineUnavailable`. Requests are never retried.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use sift_core::{Error, Result};

use crate::backend::SearchEngine;
use crate::config::ElasticConfig;
use crate::query::SearchRequest;
use crate::schema::{parse_field_tree, FieldTree};
use crate::types::SearchHit;

/// Search engine backed by an Elasticsearch-compatible cluster.
pub struct ElasticEngine {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, Option<String>)>,
}

impl ElasticEngine {
    /// Create an engine from connection settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the HTTP client cannot be built.
    pub fn new(config: &ElasticConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone())),
        })
    }

    fn endpoint(&self, index: &str, operation: &str) -> String {
        format!("{}/{index}/{operation}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_deref()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, index: &str) -> Result<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| Error::engine_unavailable_with_source("request failed", e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::index_not_found(index)),
            status if status.is_success() => Ok(response),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::engine_unavailable(format!(
                    "engine answered HTTP {status} for index '{index}': {body}"
                )))
            }
        }
    }

    async fn read_json(response: Response) -> Result<Value> {
        response
            .json()
            .await
            .map_err(|e| Error::engine_unavailable_with_source("unreadable response body", e))
    }
}

#[async_trait]
impl SearchEngine for ElasticEngine {
    async fn fetch_mapping(&self, index: &str) -> Result<FieldTree> {
        log::debug!("Fetching mapping of index '{index}'");

        let request = self.client.get(self.endpoint(index, "_mapping"));
        let response = self.send(request, index).await?;
        let body = Self::read_json(response).await?;

        parse_mapping_response(index, &body)
    }

    async fn execute(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let index = request.index();
        log::debug!("Executing search on index '{index}'");

        let http = self
            .client
            .post(self.endpoint(index, "_search"))
            .json(&request.body());
        let response = self.send(http, index).await?;
        let body = Self::read_json(response).await?;

        let hits = parse_search_response(&body)?;
        log::debug!("Index '{index}' returned {} hits", hits.len());
        Ok(hits)
    }

    fn name(&self) -> &str {
        "elastic"
    }
}

impl std::fmt::Debug for ElasticEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticEngine")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.credentials.is_some())
            .finish()
    }
}

/// Extract the field tree from a `_mapping` response.
///
/// The response is keyed by concrete index name, which differs from the
/// requested name when an alias was used; a single entry is accepted either
/// way.
pub fn parse_mapping_response(index: &str, body: &Value) -> Result<FieldTree> {
    let indices = body
        .as_object()
        .ok_or_else(|| Error::engine_unavailable("mapping response is not an object"))?;

    let entry = match indices.get(index) {
        Some(entry) => Some(entry),
        None if indices.len() == 1 => indices.values().next(),
        None => None,
    }
    .ok_or_else(|| Error::index_not_found(index))?;

    match entry.get("mappings") {
        Some(mappings) => parse_field_tree(mappings)
            .map_err(|e| Error::engine_unavailable_with_source("malformed mapping response", e)),
        None => Ok(FieldTree::new()),
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_score", default)]
    score: Option<f64>,

    #[serde(rename = "_source", default)]
    source: Value,

    #[serde(default)]
    highlight: HashMap<String, Vec<String>>,
}

/// Extract ranked hits from a `_search` response.
///
/// Hits without a score are reported with score `0.0`.
pub fn parse_search_response(body: &Value) -> Result<Vec<SearchHit>> {
    let response = SearchResponse::deserialize(body)
        .map_err(|e| Error::engine_unavailable_with_source("malformed search response", e))?;

    Ok(response
        .hits
        .hits
        .into_iter()
        .map(|hit| SearchHit {
            score: hit.score.unwrap_or(0.0),
            document: hit.source,
            highlights: hit.highlight,
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
