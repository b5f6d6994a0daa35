//! The immutable snapshot produced by a preparation run
//!
//! A [`PreparedDataset`] bundles everything the query engine reads: the
//! feature schema, normalization parameters, raw and normalized matrices,
//! the mean profile, cluster labels and per-country metadata. It is built
//! once and never mutated; a reload builds a new snapshot.

use std::iter;

use compass_stats::descriptive::DescriptiveStats;
use ndarray::Array2;
use serde::Serialize;
use serde_json::Value;

use crate::{
    PrepareError,
    cluster::{self, ClusterAssignment, KMeansParams},
    normalization::{self, NormalizationParams},
    record::{CountryMetadata, FlatRecord},
    schema::FeatureSchema,
};

/// Options controlling a preparation run.
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareOptions {
    /// Number of clusters to partition countries into
    pub n_clusters: usize,
    /// Seed for the clustering random stream
    pub seed: u64,
    /// Number of k-means restarts
    pub n_init: usize,
    /// Maximum Lloyd iterations per restart
    pub max_iter: usize,
    /// Convergence threshold on the total squared centroid shift
    pub tolerance: f64,
    /// Explicit feature list; `None` discovers numeric columns from the data
    pub features: Option<Vec<String>>,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        let kmeans = KMeansParams::default();
        Self {
            n_clusters: kmeans.n_clusters,
            seed: kmeans.seed,
            n_init: kmeans.n_init,
            max_iter: kmeans.max_iter,
            tolerance: kmeans.tolerance,
            features: None,
        }
    }
}

impl PrepareOptions {
    fn kmeans_params(&self) -> KMeansParams {
        KMeansParams {
            n_clusters: self.n_clusters,
            n_init: self.n_init,
            max_iter: self.max_iter,
            tolerance: self.tolerance,
            seed: self.seed,
        }
    }
}

/// A country after preparation: display metadata plus its cluster label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRecord {
    #[serde(flatten)]
    pub metadata: CountryMetadata,
    pub cluster: usize,
}

/// Read-only state shared by every recommendation request.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    schema: FeatureSchema,
    params: NormalizationParams,
    raw: Array2<f64>,
    normalized: Array2<f64>,
    raw_mean: Vec<f64>,
    clusters: ClusterAssignment,
    records: Vec<CountryRecord>,
}

impl PreparedDataset {
    /// Runs the full preparation pipeline over raw JSON records.
    ///
    /// Fails if the dataset is empty, a record is not an object, no numeric
    /// feature exists (or the explicit feature list does not match the data),
    /// or `n_clusters` is zero.
    pub fn prepare(raw_records: &[Value], options: &PrepareOptions) -> Result<Self, PrepareError> {
        if raw_records.is_empty() {
            return Err(PrepareError::EmptyDataset);
        }
        if options.n_clusters == 0 {
            return Err(PrepareError::ZeroClusters);
        }

        let flat = raw_records
            .iter()
            .enumerate()
            .map(|(index, raw)| FlatRecord::flatten(raw).ok_or(PrepareError::NotAnObject { index }))
            .collect::<Result<Vec<_>, _>>()?;

        let schema = match &options.features {
            Some(features) => {
                let schema = FeatureSchema::new(features.iter().cloned())?;
                schema.validate(&flat)?;
                schema
            }
            None => FeatureSchema::discover(&flat)?,
        };

        let raw = schema.extract(&flat)?;
        let params = NormalizationParams::fit(&raw);
        let normalized = params.transform_matrix(&raw);
        let raw_mean = normalization::column_means(&raw);
        let clusters = cluster::kmeans(&normalized, &options.kmeans_params())
            .map_err(PrepareError::Clustering)?;

        let records = iter::zip(&flat, clusters.labels())
            .map(|(record, label)| CountryRecord {
                metadata: CountryMetadata::from_record(record),
                cluster: *label,
            })
            .collect::<Vec<_>>();

        tracing::info!(
            countries = records.len(),
            features = schema.len(),
            clusters = clusters.n_clusters(),
            inertia = clusters.inertia(),
            "dataset prepared"
        );
        tracing::debug!(features = ?schema.names(), "feature schema");

        Ok(Self {
            schema,
            params,
            raw,
            normalized,
            raw_mean,
            clusters,
            records,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn normalization(&self) -> &NormalizationParams {
        &self.params
    }

    /// Raw feature values, one row per country, in schema order.
    #[must_use]
    pub fn raw(&self) -> &Array2<f64> {
        &self.raw
    }

    /// Normalized feature values, one row per country, in schema order.
    #[must_use]
    pub fn normalized(&self) -> &Array2<f64> {
        &self.normalized
    }

    /// Per-feature mean of the raw (pre-normalization) values.
    #[must_use]
    pub fn raw_mean(&self) -> &[f64] {
        &self.raw_mean
    }

    /// The mean profile mapped through the dataset's normalization parameters.
    #[must_use]
    pub fn normalized_mean(&self) -> Vec<f64> {
        self.params.transform(&self.raw_mean)
    }

    #[must_use]
    pub fn clusters(&self) -> &ClusterAssignment {
        &self.clusters
    }

    #[must_use]
    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Describes every cluster: its members and mean normalized profile.
    #[must_use]
    pub fn cluster_summaries(&self) -> Vec<ClusterSummary> {
        self.clusters
            .groups()
            .into_iter()
            .enumerate()
            .map(|(cluster, members)| {
                let profile = self
                    .schema
                    .names()
                    .iter()
                    .enumerate()
                    .map(|(col, feature)| {
                        let stats = DescriptiveStats::new(
                            members.iter().map(|row| self.normalized[[*row, col]]),
                        )
                        .expect("clusters are never empty");
                        FeatureProfile {
                            feature: feature.clone(),
                            mean: stats.mean,
                            std_dev: stats.std_dev,
                        }
                    })
                    .collect();
                ClusterSummary {
                    cluster,
                    size: members.len(),
                    members: members
                        .iter()
                        .map(|row| self.records[*row].metadata.name.clone())
                        .collect(),
                    profile,
                }
            })
            .collect()
    }
}

/// Overview of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub size: usize,
    /// Member display names in dataset order
    pub members: Vec<String>,
    /// Per-feature distribution of the members' normalized values
    pub profile: Vec<FeatureProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureProfile {
    pub feature: String,
    pub mean: f64,
    pub std_dev: f64,
}
