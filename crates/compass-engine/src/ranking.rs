//! Similarity ranking with cluster-first candidate selection
//!
//! # Selection Rule
//!
//! 1. Score every country by cosine similarity to the query vector
//! 2. The best match is the first country with the maximum similarity
//! 3. If the best match's cluster has fewer than `top_k` members, rank the
//!    whole dataset; otherwise rank only that cluster
//! 4. Equal similarities keep dataset order

use compass_stats::vector;
use ndarray::Array2;

use crate::query::round_to;

/// Decimal places kept in recommendation scores.
pub const SCORE_DECIMALS: i32 = 2;

/// Which countries were eligible for the final ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum CandidatePool {
    /// Restricted to members of the given cluster
    Cluster(usize),
    /// The best match's cluster was too small; the whole dataset was ranked
    Global,
}

/// Cosine similarity of `query` against every row of `matrix`.
#[must_use]
pub fn similarities(query: &[f64], matrix: &Array2<f64>) -> Vec<f64> {
    matrix
        .outer_iter()
        .map(|row| vector::cosine_similarity(query, &row.to_vec()))
        .collect()
}

/// Index of the first maximum, or `None` for an empty slice.
#[must_use]
pub fn best_match(similarities: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, sim) in similarities.iter().enumerate() {
        if best.is_none_or(|b| *sim > similarities[b]) {
            best = Some(index);
        }
    }
    best
}

/// Sorts `indices` by descending similarity, keeping the input order on ties.
fn rank(indices: &mut [usize], similarities: &[f64]) {
    indices.sort_by(|a, b| similarities[*b].total_cmp(&similarities[*a]));
}

/// Applies the cluster-first-then-global rule.
///
/// Returns the pool that was ranked and up to `top_k` row indices, best first.
#[must_use]
pub fn select_candidates(
    similarities: &[f64],
    labels: &[usize],
    best: usize,
    top_k: usize,
) -> (CandidatePool, Vec<usize>) {
    debug_assert_eq!(similarities.len(), labels.len(), "length mismatch");
    let target = labels[best];
    let members = (0..labels.len())
        .filter(|index| labels[*index] == target)
        .collect::<Vec<_>>();

    let (pool, mut candidates) = if members.len() < top_k {
        (CandidatePool::Global, (0..similarities.len()).collect())
    } else {
        (CandidatePool::Cluster(target), members)
    };
    rank(&mut candidates, similarities);
    candidates.truncate(top_k);
    (pool, candidates)
}

/// Scales a cosine similarity to a 0-100 score with two decimals.
///
/// # Examples
///
/// ```
/// use compass_engine::ranking::scale_score;
///
/// assert_eq!(scale_score(1.0), 100.0);
/// assert_eq!(scale_score(0.0), 0.0);
/// assert_eq!(scale_score(0.87654), 87.65);
/// assert_eq!(scale_score(-0.2), 0.0);
/// ```
#[must_use]
pub fn scale_score(similarity: f64) -> f64 {
    round_to((similarity * 100.0).clamp(0.0, 100.0), SCORE_DECIMALS)
}
