//! Dataset preparation for the Compass country recommender
//!
//! This crate turns a raw JSON dataset of country records into an immutable
//! [`PreparedDataset`] snapshot that the query engine reads from.
//!
//! # Preparation Workflow
//!
//! 1. **Flatten Records** ([`record::FlatRecord`]): nested objects become dotted-path columns
//! 2. **Fix the Schema** ([`schema::FeatureSchema`]): explicit feature list, or discovered
//!    numeric columns
//! 3. **Extract Raw Values** ([`schema::FeatureSchema::extract`]): an `ndarray` matrix with
//!    one row per country
//! 4. **Normalize** ([`normalization::NormalizationParams`]): per-feature min-max scaling
//! 5. **Cluster** ([`cluster::kmeans`]): seeded `linfa` k-means over the normalized rows
//!
//! # Example
//!
//! ```
//! use compass_dataset::{PrepareOptions, PreparedDataset};
//! use serde_json::json;
//!
//! let raw = vec![
//!     json!({ "name": { "common": "A" }, "education_index": 0.9, "wealth_index": 0.2 }),
//!     json!({ "name": { "common": "B" }, "education_index": 0.4, "wealth_index": 0.8 }),
//!     json!({ "name": { "common": "C" }, "education_index": 0.1, "wealth_index": 0.5 }),
//! ];
//! let options = PrepareOptions {
//!     n_clusters: 2,
//!     ..PrepareOptions::default()
//! };
//! let dataset = PreparedDataset::prepare(&raw, &options)?;
//!
//! assert_eq!(dataset.schema().names(), ["education_index", "wealth_index"]);
//! assert_eq!(dataset.normalized().row(0).to_vec(), [1.0, 0.0]);
//! assert_eq!(dataset.len(), 3);
//! # Ok::<(), compass_dataset::PrepareError>(())
//! ```

pub use self::prepared::{ClusterSummary, CountryRecord, PrepareOptions, PreparedDataset};

pub mod cluster;
pub mod normalization;
pub mod prepared;
pub mod record;
pub mod schema;

/// Reasons the dataset cannot be turned into a usable snapshot.
///
/// All variants are fatal at startup.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PrepareError {
    #[display("dataset contains no records")]
    EmptyDataset,
    #[display("dataset has no column that is numeric in every record")]
    NoNumericFeatures,
    #[display("number of clusters must be positive")]
    ZeroClusters,
    #[display("record #{index} is not a JSON object")]
    NotAnObject { index: usize },
    #[display("feature list is empty")]
    EmptySchema,
    #[display("feature '{feature}' is listed more than once")]
    DuplicateFeature { feature: String },
    #[display("record #{index} has no value for feature '{feature}'")]
    MissingFeature { feature: String, index: usize },
    #[display("record #{index} has a non-numeric value for feature '{feature}'")]
    NonNumericFeature { feature: String, index: usize },
    #[display("clustering failed: {_0}")]
    Clustering(linfa_clustering::KMeansError),
}
