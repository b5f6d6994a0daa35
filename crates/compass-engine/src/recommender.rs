//! Process-wide recommender state and the per-request entry point
//!
//! [`Recommender`] owns the current [`PreparedDataset`] snapshot behind an
//! `Arc`. Requests clone the `Arc` and work on it without holding the lock,
//! so a reload swaps the whole snapshot at once: in-flight requests finish on
//! the old one and later requests see only the new one.
//!
//! # Example
//!
//! ```
//! use compass_dataset::PrepareOptions;
//! use compass_engine::{Recommender, RecommenderConfig};
//! use serde_json::json;
//!
//! let raw = vec![
//!     json!({ "name": { "common": "A" }, "education_index": 0.9, "wealth_index": 60 }),
//!     json!({ "name": { "common": "B" }, "education_index": 0.2, "wealth_index": 90 }),
//!     json!({ "name": { "common": "C" }, "education_index": 0.5, "wealth_index": 10 }),
//! ];
//!
//! let recommender = Recommender::new(RecommenderConfig::default());
//! recommender.prepare(&raw, &PrepareOptions::default())?;
//!
//! let result = recommender.recommend("strong education")?;
//! assert_eq!(result.best_match.name, "A");
//! assert_eq!(result.recommendations.len(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use compass_dataset::{CountryRecord, PrepareError, PrepareOptions, PreparedDataset};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::{
    InvalidInputError, RecommendError,
    query::{Criteria, QueryProfile},
    ranking::{self, CandidatePool},
    rules::RuleTable,
};

/// Tunables of the query engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    /// Number of recommendations returned by [`Recommender::recommend`]
    pub top_k: usize,
    /// Longest accepted query text, in characters
    pub max_text_len: usize,
    pub rules: RuleTable,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_text_len: 4096,
            rules: RuleTable::default(),
        }
    }
}

/// Result of a recommendation request.
///
/// Field names and nesting are the JSON contract consumed by the HTTP adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub criteria: Criteria,
    pub best_match: BestMatch,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestMatch {
    pub name: String,
    pub cluster: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub capital: Option<Value>,
    pub description: Option<String>,
    pub cluster: usize,
    /// Cosine similarity scaled to `[0, 100]`, two decimals
    pub score: f64,
}

impl Recommendation {
    fn new(record: &CountryRecord, similarity: f64) -> Self {
        let meta = &record.metadata;
        Self {
            name: meta.name.clone(),
            region: meta.region.clone(),
            subregion: meta.subregion.clone(),
            capital: meta.capital.clone(),
            description: meta.description.clone(),
            cluster: record.cluster,
            score: ranking::scale_score(similarity),
        }
    }
}

/// Read-only query engine over one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    dataset: &'a PreparedDataset,
    rules: &'a RuleTable,
}

impl<'a> QueryEngine<'a> {
    #[must_use]
    pub fn new(dataset: &'a PreparedDataset, rules: &'a RuleTable) -> Self {
        Self { dataset, rules }
    }

    /// Translates free text into a query profile.
    #[must_use]
    pub fn build_query_vector(&self, text: &str) -> QueryProfile {
        QueryProfile::build(self.dataset, self.rules, text)
    }

    /// Ranks countries against `text` and returns up to `top_k` of them.
    ///
    /// Does not validate `text`; `top_k` must be positive.
    #[must_use]
    pub fn recommend(&self, text: &str, top_k: usize) -> RecommendationResult {
        self.rank(text, top_k).1
    }

    /// Like [`Self::recommend`], also reporting which pool was ranked.
    #[must_use]
    pub fn rank(&self, text: &str, top_k: usize) -> (CandidatePool, RecommendationResult) {
        debug_assert!(top_k > 0, "top_k must be positive");
        let profile = self.build_query_vector(text);
        let sims = ranking::similarities(&profile.vector, self.dataset.normalized());
        let labels = self.dataset.clusters().labels();
        let best = ranking::best_match(&sims).expect("prepared datasets are never empty");

        let (pool, picked) = ranking::select_candidates(&sims, labels, best, top_k);
        tracing::debug!(
            best,
            similarity = sims[best],
            global = pool.is_global(),
            picked = picked.len(),
            "candidates selected"
        );

        let records = self.dataset.records();
        let best_record = &records[best];
        let result = RecommendationResult {
            criteria: profile.criteria,
            best_match: BestMatch {
                name: best_record.metadata.name.clone(),
                cluster: best_record.cluster,
            },
            recommendations: picked
                .into_iter()
                .map(|index| Recommendation::new(&records[index], sims[index]))
                .collect(),
        };
        (pool, result)
    }
}

/// Shared recommender: configuration plus the swappable dataset snapshot.
///
/// `Recommender` is `Send + Sync`; wrap it in an `Arc` to share it between
/// request handlers.
#[derive(Debug)]
pub struct Recommender {
    config: RecommenderConfig,
    state: RwLock<Option<Arc<PreparedDataset>>>,
}

impl Recommender {
    /// Creates an unprepared recommender.
    #[must_use]
    pub fn new(config: RecommenderConfig) -> Self {
        Self {
            config,
            state: RwLock::new(None),
        }
    }

    /// Creates a recommender that serves `dataset` right away.
    #[must_use]
    pub fn with_dataset(config: RecommenderConfig, dataset: PreparedDataset) -> Self {
        Self {
            config,
            state: RwLock::new(Some(Arc::new(dataset))),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Prepares `raw_records` and installs the result.
    ///
    /// Used at startup and for reloads. On failure the current snapshot (if
    /// any) stays in place.
    pub fn prepare(&self, raw_records: &[Value], options: &PrepareOptions) -> Result<(), PrepareError> {
        let dataset = PreparedDataset::prepare(raw_records, options)?;
        self.install(dataset);
        Ok(())
    }

    /// Replaces the current snapshot, returning the previous one.
    pub fn install(&self, dataset: PreparedDataset) -> Option<Arc<PreparedDataset>> {
        let previous = self.state.write().replace(Arc::new(dataset));
        tracing::info!(replaced = previous.is_some(), "dataset snapshot installed");
        previous
    }

    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.state.read().is_some()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Result<Arc<PreparedDataset>, RecommendError> {
        self.state.read().clone().ok_or(RecommendError::NotPrepared)
    }

    /// Translates free text into a query profile against the current snapshot.
    ///
    /// Any text is accepted here; empty text yields the mean profile.
    pub fn build_query_vector(&self, text: &str) -> Result<QueryProfile, RecommendError> {
        self.check_length(text)?;
        let dataset = self.snapshot()?;
        Ok(QueryEngine::new(&dataset, &self.config.rules).build_query_vector(text))
    }

    /// Recommends [`RecommenderConfig::top_k`] countries for `text`.
    pub fn recommend(&self, text: &str) -> Result<RecommendationResult, RecommendError> {
        self.recommend_top(text, self.config.top_k)
    }

    /// Recommends up to `top_k` countries for `text`.
    ///
    /// Blank text and a zero `top_k` are rejected as invalid input.
    pub fn recommend_top(
        &self,
        text: &str,
        top_k: usize,
    ) -> Result<RecommendationResult, RecommendError> {
        if text.trim().is_empty() {
            return Err(InvalidInputError::BlankText.into());
        }
        if top_k == 0 {
            return Err(InvalidInputError::ZeroTopK.into());
        }
        self.check_length(text)?;
        let dataset = self.snapshot()?;
        Ok(QueryEngine::new(&dataset, &self.config.rules).recommend(text, top_k))
    }

    fn check_length(&self, text: &str) -> Result<(), InvalidInputError> {
        let len = text.chars().count();
        if len > self.config.max_text_len {
            return Err(InvalidInputError::TextTooLong {
                len,
                max: self.config.max_text_len,
            });
        }
        Ok(())
    }
}
