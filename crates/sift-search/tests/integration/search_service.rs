//! Integration tests for search execution and query previews.

use sift_search::{Analyser, Error, SearchField, PLACEHOLDER_QUERY};

use crate::common::{catalog_mapping, profile, MockEngine, TestHarness};

fn scores(results: &sift_search::SearchResults) -> Vec<f64> {
    results.results().iter().map(|r| r.score).collect()
}

#[tokio::test]
async fn test_search_filters_non_queryable_profile() {
    let harness = TestHarness::with_engine(
        MockEngine::new().with_scores(&[10.0, 9.0, 9.0, 3.0, 2.0]),
    );
    let mut profile = profile("p-1", "5d2a");
    profile.queryable = false;
    profile.relative_score = Some(4.0);
    harness.add_profile(profile);

    let results = harness
        .service
        .search("p-1", "searchText")
        .await
        .expect("search should succeed");

    assert_eq!(scores(&results), vec![10.0, 9.0, 9.0]);
    assert_eq!(results.number_of_results(), 3);
}

#[tokio::test]
async fn test_search_returns_raw_results_for_queryable_profile() {
    let harness = TestHarness::with_engine(
        MockEngine::new().with_scores(&[10.0, 9.0, 9.0, 3.0, 2.0]),
    );
    let mut profile = profile("p-1", "5d2a");
    profile.relative_score = Some(4.0);
    harness.add_profile(profile);

    let results = harness.service.search("p-1", "searchText").await.unwrap();
    assert_eq!(results.number_of_results(), 5);
}

#[tokio::test]
async fn test_search_single_result_is_unchanged() {
    let harness = TestHarness::with_engine(MockEngine::new().with_scores(&[5.0]));
    let mut profile = profile("p-1", "5d2a");
    profile.queryable = false;
    profile.relative_score = Some(1.0);
    harness.add_profile(profile);

    let results = harness.service.search("p-1", "q").await.unwrap();
    assert_eq!(scores(&results), vec![5.0]);
}

#[tokio::test]
async fn test_search_targets_partial_word_index() {
    let harness = TestHarness::with_engine(MockEngine::new().with_scores(&[1.0]));
    let mut profile = profile("p-1", "5d2a");
    profile.analyser = Analyser {
        fault_tolerant: true,
        partial_word_search: true,
    };
    harness.add_profile(profile);

    harness.service.search("p-1", "searchText").await.unwrap();

    let requests = harness.engine.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].index(), "5d2a_partial_word");

    let rendered = requests[0].to_string();
    assert!(rendered.starts_with("POST /5d2a_partial_word/_search "));
    assert!(rendered.contains("text^1.0"));
    assert!(rendered.contains("title^2.0"));
    assert!(rendered.contains("id^0.5"));
    assert!(rendered.contains("\"fuzziness\":\"AUTO\""));
    assert!(rendered.contains("\"fuzzy_transpositions\":true"));
}

#[tokio::test]
async fn test_search_passes_min_score_to_engine() {
    let harness = TestHarness::with_engine(MockEngine::new().with_scores(&[4.0, 3.0]));
    let mut profile = profile("p-1", "5d2a");
    profile.min_score = Some(2.5);
    harness.add_profile(profile);

    harness.service.search("p-1", "q").await.unwrap();

    let requests = harness.engine.requests();
    assert_eq!(requests[0].min_score(), Some(2.5));
}

#[tokio::test]
async fn test_search_excludes_disabled_fields() {
    let harness = TestHarness::with_engine(MockEngine::new());
    let mut profile = profile("p-1", "5d2a");
    profile.fields.push(SearchField::new("internal", false, 9.0));
    harness.add_profile(profile);

    harness.service.search("p-1", "q").await.unwrap();

    let rendered = harness.engine.requests()[0].to_string();
    assert!(!rendered.contains("internal"));
}

#[tokio::test]
async fn test_search_unknown_profile() {
    let harness = TestHarness::with_engine(MockEngine::new());

    let err = harness.service.search("missing", "q").await.unwrap_err();
    assert!(matches!(err, Error::ProfileNotFound { .. }));
    assert!(err.is_not_found());
    assert!(harness.engine.requests().is_empty());
}

#[tokio::test]
async fn test_search_propagates_engine_failure() {
    let harness = TestHarness::with_engine(MockEngine::new().with_scores(&[1.0]));
    harness.add_profile(profile("p-1", "5d2a"));
    harness.engine.set_unavailable(true);

    let err = harness.service.search("p-1", "q").await.unwrap_err();
    assert!(matches!(err, Error::EngineUnavailable { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_query_preview_for_queryable_profile() {
    let harness = TestHarness::with_engine(MockEngine::new());
    harness.add_profile(profile("p-1", "5d2a"));

    let request = harness.service.query_preview("p-1").await.unwrap();
    let rendered = request.to_string();

    assert!(rendered.starts_with("POST /5d2a/_search "));
    assert!(rendered.contains(PLACEHOLDER_QUERY));
    assert!(rendered.contains("\"should\""));
    assert!(harness.engine.requests().is_empty());
}

#[tokio::test]
async fn test_query_preview_with_explicit_query() {
    let harness = TestHarness::with_engine(MockEngine::new());
    harness.add_profile(profile("p-1", "5d2a"));

    let request = harness
        .service
        .query_preview_with("p-1", "red shoes")
        .await
        .unwrap();
    assert!(request.to_string().contains("\"query\":\"red shoes\""));
}

#[tokio::test]
async fn test_query_preview_rejects_non_queryable_profile() {
    let harness = TestHarness::with_engine(MockEngine::new());
    let mut profile = profile("p-1", "5d2a");
    profile.queryable = false;
    harness.add_profile(profile);

    let err = harness.service.query_preview("p-1").await.unwrap_err();
    assert!(matches!(err, Error::NotQueryable { ref profile_id } if profile_id == "p-1"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_default_search_fields_for_new_profile() {
    let harness =
        TestHarness::with_engine(MockEngine::new().with_mapping("5d2a", catalog_mapping()));

    let fields = harness
        .service
        .default_search_fields("5d2a")
        .await
        .unwrap();

    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["certificate.name", "name"]);
    assert!(fields.iter().all(|f| f.enabled && f.boost == 1.0));
}
