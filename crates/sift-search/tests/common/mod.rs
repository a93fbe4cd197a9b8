//! Common test utilities and harness for Sift integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;
use sift_search::{
    parse_field_tree, Error, FieldTree, InMemoryProfileStore, Result, SearchEngine, SearchField,
    SearchHit, SearchProfileConfig, SearchRequest, SearchService,
};

/// Mock search engine with canned mappings and hits.
///
/// Indices without a registered mapping answer `IndexNotFound`. Every call is
/// counted, and executed requests are recorded for inspection.
#[derive(Default)]
pub struct MockEngine {
    mappings: Mutex<HashMap<String, FieldTree>>,
    hits: Mutex<Vec<SearchHit>>,
    unavailable: Mutex<bool>,
    fetches: AtomicUsize,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockEngine {
    /// Creates an engine with no indices and no hits.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a mapping document (`{"properties": {...}}`) for `index`.
    pub fn with_mapping(self: Arc<Self>, index: &str, mapping: serde_json::Value) -> Arc<Self> {
        self.set_mapping(index, mapping);
        self
    }

    /// Makes every search return hits with the given scores, in order.
    pub fn with_scores(self: Arc<Self>, scores: &[f64]) -> Arc<Self> {
        let hits = scores
            .iter()
            .enumerate()
            .map(|(rank, &score)| SearchHit {
                score,
                document: json!({ "rank": rank }),
                highlights: HashMap::new(),
            })
            .collect();
        *self.hits.lock().unwrap() = hits;
        self
    }

    /// Replaces the mapping of `index`.
    pub fn set_mapping(&self, index: &str, mapping: serde_json::Value) {
        let tree = parse_field_tree(&mapping).unwrap();
        self.mappings
            .lock()
            .unwrap()
            .insert(index.to_string(), tree);
    }

    /// Makes every call fail as if the engine were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    /// Number of mapping fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Requests executed so far.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<()> {
        if *self.unavailable.lock().unwrap() {
            return Err(Error::engine_unavailable("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchEngine for MockEngine {
    async fn fetch_mapping(&self, index: &str) -> Result<FieldTree> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        // Give concurrent callers a chance to interleave.
        tokio::task::yield_now().await;

        self.mappings
            .lock()
            .unwrap()
            .get(index)
            .cloned()
            .ok_or_else(|| Error::index_not_found(index))
    }

    async fn execute(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        self.check_available()?;
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.hits.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Engine whose first mapping fetch reads the mapping, then stalls until
/// released.
///
/// Lets a test land a write between the moment a fetch observed the engine
/// and the moment its caller stores the result.
pub struct GatedEngine {
    inner: Arc<MockEngine>,
    gated: AtomicBool,
    fetching: Notify,
    release: Notify,
}

impl GatedEngine {
    /// Wraps `inner`, gating its next mapping fetch.
    pub fn new(inner: Arc<MockEngine>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            gated: AtomicBool::new(true),
            fetching: Notify::new(),
            release: Notify::new(),
        })
    }

    /// The wrapped engine.
    pub fn inner(&self) -> &MockEngine {
        &self.inner
    }

    /// Waits until the gated fetch has read its mapping.
    pub async fn wait_until_fetching(&self) {
        self.fetching.notified().await;
    }

    /// Lets the gated fetch return.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl SearchEngine for GatedEngine {
    async fn fetch_mapping(&self, index: &str) -> Result<FieldTree> {
        let mapping = self.inner.fetch_mapping(index).await;
        if self.gated.swap(false, Ordering::SeqCst) {
            self.fetching.notify_one();
            self.release.notified().await;
        }
        mapping
    }

    async fn execute(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        self.inner.execute(request).await
    }

    fn name(&self) -> &str {
        "gated"
    }
}

/// Mapping used by most tests: the nested document of the flattening
/// scenario.
pub fn catalog_mapping() -> serde_json::Value {
    json!({
        "properties": {
            "name": { "type": "text" },
            "certificate": {
                "properties": {
                    "name": { "type": "text" },
                    "available": { "type": "boolean" }
                }
            },
            "object1": { "properties": {
                "object2": { "properties": {
                    "object3": { "properties": {
                        "object4": { "properties": {
                            "object5": { "properties": {
                                "object6": { "properties": {
                                    "deep": { "type": "text" }
                                } }
                            } }
                        } }
                    } }
                } }
            } }
        }
    })
}

/// A queryable profile over `application_id` with three weighted text
/// fields.
pub fn profile(profile_id: &str, application_id: &str) -> SearchProfileConfig {
    let mut profile = SearchProfileConfig::new(profile_id, application_id);
    profile.queryable = true;
    profile.fields = vec![
        SearchField::new("text", true, 1.0),
        SearchField::new("title", true, 2.0),
        SearchField::new("id", true, 0.5),
    ];
    profile
}

/// Test harness wiring a mock engine and an in-memory profile store into a
/// search service.
pub struct TestHarness {
    /// Mock engine shared with the service
    pub engine: Arc<MockEngine>,
    /// Profile store shared with the service
    pub profiles: Arc<InMemoryProfileStore>,
    /// Service under test
    pub service: SearchService,
}

impl TestHarness {
    /// Creates a harness around `engine`.
    pub fn with_engine(engine: Arc<MockEngine>) -> Self {
        let profiles = Arc::new(InMemoryProfileStore::new());
        let service = SearchService::new(engine.clone(), profiles.clone());
        Self {
            engine,
            profiles,
            service,
        }
    }

    /// Stores `profile`, panicking if it is invalid.
    pub fn add_profile(&self, profile: SearchProfileConfig) {
        self.profiles.insert(profile).expect("profile should be valid");
    }
}
