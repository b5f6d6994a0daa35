use std::path::PathBuf;

use serde::Serialize;

use crate::{
    command::{DatasetArg, EngineArg},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CriteriaArg {
    #[clap(flatten)]
    dataset: DatasetArg,
    #[clap(flatten)]
    engine: EngineArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Free-text description; empty shows the average country
    #[arg(default_value = "")]
    text: String,
}

#[derive(Debug, Serialize)]
struct CriteriaReport<'a> {
    matched: Vec<String>,
    criteria: &'a compass_engine::Criteria,
}

pub(crate) fn run(arg: &CriteriaArg) -> anyhow::Result<()> {
    let CriteriaArg {
        dataset,
        engine,
        output,
        text,
    } = arg;
    let config = engine.config(compass_engine::RecommenderConfig::default().top_k)?;
    let recommender = util::load_recommender(&dataset.data, &dataset.prepare_options(), config)?;

    let profile = recommender.build_query_vector(text)?;
    let report = CriteriaReport {
        matched: profile.matched.iter().map(ToString::to_string).collect(),
        criteria: &profile.criteria,
    };
    util::save_json(&report, output.as_deref())?;
    Ok(())
}
