//! Seeded k-means clustering over the normalized feature matrix
//!
//! The fit itself is [`linfa_clustering::KMeans`] (k-means++ seeding, Lloyd
//! iterations, best of `n_init` restarts) driven by a seeded xoshiro stream.
//! This module adds what the recommender relies on around it:
//!
//! - The effective number of clusters is `min(n_clusters, distinct rows)`.
//! - Labels are renumbered in order of first appearance in the dataset, so they
//!   are contiguous in `[0, k)` and independent of the fitted centroid order.
//! - Inertia is the plain sum of squared distances to the assigned centroid.
//!
//! Given the same matrix and seed the result is identical across runs.

use std::collections::HashSet;

use linfa::{
    DatasetBase,
    traits::{Fit as _, Predict as _},
};
use linfa_clustering::{KMeans, KMeansError};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand_xoshiro::{Xoshiro256Plus, rand_core::SeedableRng as _};

/// Parameters of the k-means run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    /// Requested number of clusters (must be positive)
    pub n_clusters: usize,
    /// Number of independently seeded restarts
    pub n_init: usize,
    /// Maximum Lloyd iterations per restart
    pub max_iter: usize,
    /// Convergence threshold on the squared centroid shift
    pub tolerance: f64,
    /// Seed of the random stream shared by all restarts
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            n_clusters: 4,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

/// Outcome of clustering: one label per row plus the fitted centroids.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    centroids: Array2<f64>,
    inertia: f64,
}

impl ClusterAssignment {
    /// Cluster label of each row, in dataset order.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Centroid of each cluster, one row per label.
    #[must_use]
    pub fn centroids(&self) -> &Array2<f64> {
        &self.centroids
    }

    /// Sum of squared distances from each row to its centroid.
    #[must_use]
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    #[must_use]
    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    /// Row indices of each cluster, indexed by label, in dataset order.
    #[must_use]
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.n_clusters()];
        for (row, label) in self.labels.iter().enumerate() {
            groups[*label].push(row);
        }
        groups
    }
}

/// Partitions the rows of `data` into clusters.
///
/// # Panics
///
/// Panics if `data` has no rows or `params.n_clusters` is zero.
pub fn kmeans(data: &Array2<f64>, params: &KMeansParams) -> Result<ClusterAssignment, KMeansError> {
    assert!(data.nrows() > 0, "cannot cluster an empty matrix");
    assert!(params.n_clusters > 0, "n_clusters must be positive");

    let distinct = count_distinct_rows(data);
    let k = params.n_clusters.min(distinct);
    if k < params.n_clusters {
        tracing::warn!(
            requested = params.n_clusters,
            distinct,
            "fewer distinct rows than requested clusters"
        );
    }

    let rng = Xoshiro256Plus::seed_from_u64(params.seed);
    let model = KMeans::params_with_rng(k, rng)
        .n_runs(params.n_init.max(1))
        .max_n_iterations(u64::try_from(params.max_iter).unwrap_or(u64::MAX))
        .tolerance(params.tolerance)
        .fit(&DatasetBase::from(data.clone()))?;
    let fitted: Array1<usize> = model.predict(data);

    let assignment = relabel(data, &fitted.to_vec(), model.centroids());
    tracing::debug!(
        k,
        clusters = assignment.n_clusters(),
        inertia = assignment.inertia,
        "k-means fitted"
    );
    Ok(assignment)
}

/// Renumbers `fitted` labels by first appearance and reorders the centroids to match.
fn relabel(data: &Array2<f64>, fitted: &[usize], centroids: &Array2<f64>) -> ClusterAssignment {
    let mut mapping = vec![None; centroids.nrows()];
    let mut order = Vec::new();
    let labels = fitted
        .iter()
        .map(|old| {
            *mapping[*old].get_or_insert_with(|| {
                order.push(*old);
                order.len() - 1
            })
        })
        .collect::<Vec<_>>();
    let centroids = centroids.select(Axis(0), &order);

    let inertia = data
        .outer_iter()
        .zip(&labels)
        .map(|(row, label)| squared_distance(row, centroids.row(*label)))
        .sum();

    ClusterAssignment {
        labels,
        centroids,
        inertia,
    }
}

fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    (&a - &b).mapv(|d| d * d).sum()
}

fn count_distinct_rows(data: &Array2<f64>) -> usize {
    data.outer_iter()
        .map(|row| row.iter().map(|v| v.to_bits()).collect::<Vec<_>>())
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn two_blobs() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [0.05, 0.1],
            [1.0, 1.0],
            [0.1, 0.0],
            [0.95, 0.9],
            [0.9, 1.0],
        ]
    }

    fn fit(data: &Array2<f64>, n_clusters: usize) -> ClusterAssignment {
        let params = KMeansParams {
            n_clusters,
            ..KMeansParams::default()
        };
        kmeans(data, &params).unwrap()
    }

    #[test]
    fn test_separates_obvious_groups() {
        let result = fit(&two_blobs(), 2);
        assert_eq!(result.labels(), [0, 0, 1, 0, 1, 1]);
        assert_eq!(result.n_clusters(), 2);
        assert_eq!(result.groups(), [vec![0, 1, 3], vec![2, 4, 5]]);
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let data = Array2::from_shape_fn((40, 3), |(i, j)| {
            let x = f64::from(u32::try_from(i * 3 + j).unwrap());
            (x * 0.37).sin().abs()
        });
        let a = fit(&data, 4);
        let b = fit(&data, 4);
        assert_eq!(a, b);
        assert_eq!(a.n_clusters(), 4);
    }

    #[test]
    fn test_every_row_in_exactly_one_cluster() {
        let data = Array2::from_shape_fn((25, 2), |(i, j)| {
            let cell = if j == 0 { i % 5 } else { i / 5 };
            f64::from(u32::try_from(cell).unwrap()) / 4.0
        });
        let result = kmeans(&data, &KMeansParams::default()).unwrap();
        let mut members = result.groups().concat();
        members.sort_unstable();
        assert_eq!(members, (0..25).collect::<Vec<_>>());
        assert!(result.labels().iter().all(|l| *l < result.n_clusters()));
    }

    #[test]
    fn test_labels_follow_first_appearance() {
        let result = fit(&array![[0.9, 0.9], [0.0, 0.1], [1.0, 1.0], [0.1, 0.0]], 2);
        assert_eq!(result.labels(), [0, 1, 0, 1]);
    }

    #[test]
    fn test_fewer_distinct_rows_than_clusters() {
        let data = array![[0.5, 0.5], [0.5, 0.5], [1.0, 0.0]];
        let result = kmeans(&data, &KMeansParams::default()).unwrap();
        assert_eq!(result.n_clusters(), 2);
        assert_eq!(result.labels(), [0, 0, 1]);
        assert_eq!(result.inertia(), 0.0);
    }

    #[test]
    fn test_single_row() {
        let result = kmeans(&array![[0.3]], &KMeansParams::default()).unwrap();
        assert_eq!(result.labels(), [0]);
        assert_eq!(*result.centroids(), array![[0.3]]);
    }

    #[test]
    fn test_centroids_are_cluster_means() {
        let result = fit(&two_blobs(), 2);
        let c0 = result.centroids().row(0);
        assert!((c0[0] - 0.05).abs() < 1e-9);
        assert!((c0[1] - (0.1 / 3.0)).abs() < 1e-9);
        assert!(result.inertia() > 0.0);
    }
}
