//! Integration tests for schema flattening through the mapping cache.

use std::sync::Arc;

use serde_json::json;
use sift_search::{Error, FieldType, MappingCache, WriteEvent};

use crate::common::{catalog_mapping, GatedEngine, MockEngine, TestHarness};

#[tokio::test]
async fn test_schema_flattens_nested_mapping() {
    let harness =
        TestHarness::with_engine(MockEngine::new().with_mapping("5d2a", catalog_mapping()));

    let schema = harness.service.schema("5d2a").await.unwrap();

    assert_eq!(schema.len(), 4);
    assert_eq!(schema.get("name"), Some(FieldType::Text));
    assert_eq!(schema.get("certificate.name"), Some(FieldType::Text));
    assert_eq!(
        schema.get("certificate.available"),
        Some(FieldType::NotSupported)
    );
    assert_eq!(
        schema.get("object1.object2.object3.object4.object5"),
        Some(FieldType::NotSupported)
    );
}

#[tokio::test]
async fn test_searchable_fields_are_cached() {
    let harness =
        TestHarness::with_engine(MockEngine::new().with_mapping("5d2a", catalog_mapping()));

    let first = harness.service.searchable_fields("5d2a").await.unwrap();
    let second = harness.service.searchable_fields("5d2a").await.unwrap();

    assert_eq!(first, vec!["certificate.name", "name"]);
    assert_eq!(first, second);
    assert_eq!(harness.engine.fetch_count(), 1);
}

#[tokio::test]
async fn test_write_event_refreshes_schema() {
    let engine = MockEngine::new().with_mapping("5d2a", json!({
        "properties": { "title": { "type": "text" } }
    }));
    let harness = TestHarness::with_engine(engine);

    let before = harness.service.searchable_fields("5d2a").await.unwrap();
    assert_eq!(before, vec!["title"]);

    harness.engine.set_mapping(
        "5d2a",
        json!({
            "properties": {
                "title": { "type": "text" },
                "summary": { "type": "text" }
            }
        }),
    );

    // Still served from the cache until a write is reported.
    let cached = harness.service.searchable_fields("5d2a").await.unwrap();
    assert_eq!(cached, vec!["title"]);

    harness.service.notify(&WriteEvent::DocumentsBulkCreated {
        index: "5d2a".to_string(),
    });

    let after = harness.service.searchable_fields("5d2a").await.unwrap();
    assert_eq!(after, vec!["summary", "title"]);
    assert_eq!(harness.engine.fetch_count(), 2);
}

#[tokio::test]
async fn test_index_deletion_surfaces_not_found() {
    let engine = MockEngine::new().with_mapping("5d2a", catalog_mapping());
    let harness = TestHarness::with_engine(engine);

    harness.service.schema("5d2a").await.unwrap();

    let mappings = harness.service.mappings();
    assert_eq!(mappings.len(), 1);
    harness.service.notify(&WriteEvent::IndexDeleted {
        index: "5d2a".to_string(),
    });
    assert!(mappings.is_empty());

    let err = harness.service.schema("missing").await.unwrap_err();
    assert!(matches!(err, Error::IndexNotFound { ref index } if index == "missing"));
    assert!(mappings.is_empty());
}

#[tokio::test]
async fn test_engine_failure_caches_nothing() {
    let engine = MockEngine::new().with_mapping("5d2a", catalog_mapping());
    engine.set_unavailable(true);
    let harness = TestHarness::with_engine(engine);

    let err = harness.service.schema("5d2a").await.unwrap_err();
    assert!(err.is_retryable());
    assert!(harness.service.mappings().is_empty());

    harness.engine.set_unavailable(false);
    assert!(harness.service.schema("5d2a").await.is_ok());
    assert_eq!(harness.service.mappings().len(), 1);
}

#[tokio::test]
async fn test_write_during_fetch_is_not_undone() {
    let engine = GatedEngine::new(MockEngine::new().with_mapping(
        "app",
        json!({ "properties": { "old": { "type": "text" } } }),
    ));
    let cache = Arc::new(MappingCache::new(engine.clone()));

    let pending = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get("app").await }
    });
    engine.wait_until_fetching().await;

    engine.inner().set_mapping(
        "app",
        json!({ "properties": { "new": { "type": "text" } } }),
    );
    cache.notify(&WriteEvent::DocumentCreated {
        index: "app".to_string(),
    });
    engine.release();

    // The in-flight reader still sees what it fetched, but does not cache it.
    let seen = pending.await.expect("task should not panic").unwrap();
    assert_eq!(seen.get("old"), Some(FieldType::Text));
    assert!(cache.is_empty());

    let fresh = cache.get("app").await.unwrap();
    assert_eq!(fresh.get("new"), Some(FieldType::Text));
    assert!(fresh.get("old").is_none());
    assert_eq!(cache.len(), 1);
    assert!(Arc::ptr_eq(&fresh, &cache.get("app").await.unwrap()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_and_invalidations() {
    let engine = MockEngine::new()
        .with_mapping("5d2a", catalog_mapping())
        .with_mapping("5d2a_partial_word", catalog_mapping());
    let cache = Arc::new(MappingCache::new(engine.clone()));

    let readers = (0..16).map(|i| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            let index = if i % 2 == 0 { "5d2a" } else { "5d2a_partial_word" };
            let schema = cache.get(index).await?;
            Ok::<_, Error>(schema.len())
        })
    });
    let invalidators = (0..8).map(|_| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache.notify(&WriteEvent::DocumentUpdated {
                index: "5d2a".to_string(),
            });
            Ok::<_, Error>(0)
        })
    });

    let outcomes = futures::future::join_all(readers.chain(invalidators)).await;
    for outcome in outcomes {
        let len = outcome.expect("task should not panic").unwrap();
        assert!(len == 0 || len == 4);
    }

    // Whatever survived the races is a complete schema.
    for index in ["5d2a", "5d2a_partial_word"] {
        assert_eq!(cache.get(index).await.unwrap().len(), 4);
    }
    assert!(engine.fetch_count() >= 2);
}
