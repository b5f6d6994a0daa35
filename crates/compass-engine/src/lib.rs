//! Query engine for the Compass country recommender
//!
//! Turns free text into a desired country profile and ranks the countries of
//! a [`compass_dataset::PreparedDataset`] against it.
//!
//! # Request Flow
//!
//! 1. **Validate** the text ([`Recommender::recommend`])
//! 2. **Build the Query Profile** ([`query::QueryProfile`]): mean profile plus
//!    keyword boosts from the [`rules::RuleTable`]
//! 3. **Score** every country by cosine similarity ([`ranking::similarities`])
//! 4. **Select Candidates** ([`ranking::select_candidates`]): the best match's
//!    cluster, or the whole dataset when that cluster is too small
//! 5. **Scale Scores** to 0-100 ([`ranking::scale_score`])
//!
//! The [`Recommender`] holds the prepared snapshot as shared, read-only state;
//! requests never mutate it and may run in parallel.

pub use self::{
    query::{Criteria, QueryProfile},
    recommender::{
        BestMatch, QueryEngine, Recommendation, RecommendationResult, Recommender,
        RecommenderConfig,
    },
    rules::RuleTable,
};

pub mod query;
pub mod ranking;
pub mod recommender;
pub mod rules;

/// Failure of a recommendation request.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum RecommendError {
    /// No dataset has been prepared yet; a server-side fault
    #[display("recommender has not been prepared")]
    NotPrepared,
    /// The request itself is unusable; a client error
    #[display("invalid input: {_0}")]
    InvalidInput(InvalidInputError),
}

impl From<InvalidInputError> for RecommendError {
    fn from(err: InvalidInputError) -> Self {
        Self::InvalidInput(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidInputError {
    #[display("query text is empty")]
    BlankText,
    #[display("query text has {len} characters, at most {max} are allowed")]
    TextTooLong { len: usize, max: usize },
    #[display("number of recommendations must be positive")]
    ZeroTopK,
}

/// Problems found while loading or validating a rule table.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RuleTableError {
    #[display("failed to parse rule table: {_0}")]
    Parse(serde_json::Error),
    #[display("rule #{index} has no trigger keywords")]
    NoTriggers { index: usize },
    #[display("rule #{index} has a blank trigger keyword")]
    BlankTrigger { index: usize },
    #[display("rule #{index} has no boosts")]
    NoBoosts { index: usize },
    #[display("rule #{index} boosts a feature with a blank name")]
    BlankFeature { index: usize },
    #[display("rule #{index} has invalid boost amount {amount}")]
    InvalidAmount { index: usize, amount: f64 },
}
