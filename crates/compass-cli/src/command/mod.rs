use std::path::PathBuf;

use clap::{Parser, Subcommand};
use compass_dataset::PrepareOptions;
use compass_engine::RecommenderConfig;

use self::{clusters::ClustersArg, criteria::CriteriaArg, recommend::RecommendArg};
use crate::{logging, util};

mod clusters;
mod criteria;
mod recommend;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Default log level when `RUST_LOG` is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Recommend countries for a free-text description
    Recommend(#[clap(flatten)] RecommendArg),
    /// Show the desired profile derived from a description
    Criteria(#[clap(flatten)] CriteriaArg),
    /// Show cluster membership and profiles
    Clusters(#[clap(flatten)] ClustersArg),
}

/// Dataset and preparation options shared by every subcommand
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DatasetArg {
    /// Path to the country dataset (JSON array of objects)
    #[arg(long)]
    data: PathBuf,
    /// Number of clusters
    #[arg(long, default_value_t = 4)]
    clusters: usize,
    /// Seed for clustering
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Number of k-means restarts
    #[arg(long, default_value_t = 10)]
    n_init: usize,
    /// Explicit comma-separated feature list (default: every numeric column)
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<String>>,
}

impl DatasetArg {
    pub(crate) fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions {
            n_clusters: self.clusters,
            seed: self.seed,
            n_init: self.n_init,
            features: self.features.clone(),
            ..PrepareOptions::default()
        }
    }
}

/// Query engine options shared by the query subcommands
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EngineArg {
    /// Keyword rule table (JSON); the built-in table is used when omitted
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Longest accepted description, in characters
    #[arg(long, default_value_t = RecommenderConfig::default().max_text_len)]
    max_text_len: usize,
}

impl EngineArg {
    pub(crate) fn config(&self, top_k: usize) -> anyhow::Result<RecommenderConfig> {
        let rules = match &self.rules {
            Some(path) => util::read_rules_file(path)?,
            None => compass_engine::RuleTable::default(),
        };
        Ok(RecommenderConfig {
            top_k,
            max_text_len: self.max_text_len,
            rules,
        })
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init(&args.log_level)?;
    match args.mode {
        Mode::Recommend(arg) => recommend::run(&arg)?,
        Mode::Criteria(arg) => criteria::run(&arg)?,
        Mode::Clusters(arg) => clusters::run(&arg)?,
    }
    Ok(())
}
