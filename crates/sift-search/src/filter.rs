//! Relative-score result filtering.
//!
//! Keeps the top cluster of a ranked result list: walking down the list, the
//! first gap between neighbouring scores that reaches `relative_score` marks
//! a cliff, and everything below the cliff is dropped.
//!
//! ```text
//! scores     10   9   9   3   2
//! gaps          1   0   6   1       relative_score = 4
//!                       ^ cliff: threshold = 9
//! kept       10   9   9
//! ```

use crate::types::SearchResults;

/// Score threshold for `scores` given `relative_score`.
///
/// Returns the score just above the first qualifying gap, or `0.0` when no
/// gap qualifies.
pub fn threshold(scores: &[f64], relative_score: f64) -> f64 {
    scores
        .windows(2)
        .find(|pair| pair[0] - pair[1] >= relative_score)
        .map(|pair| pair[0])
        .unwrap_or(0.0)
}

/// Drop every result scoring below the first score cliff.
///
/// Expects results in descending score order. Ties are handled purely by
/// position: results tied with the score above the cliff are kept.
pub fn apply(mut results: SearchResults, relative_score: f64) -> SearchResults {
    let scores: Vec<f64> = results.results().iter().map(|r| r.score).collect();
    let cutoff = threshold(&scores, relative_score);

    let before = results.number_of_results();
    results.retain(|result| result.score >= cutoff);
    log::debug!(
        "Relative score {relative_score}: threshold {cutoff}, kept {} of {before} results",
        results.number_of_results()
    );

    results
}

// ============================================================================
// Tests
// ============================================================================
