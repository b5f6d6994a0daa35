use std::path::PathBuf;

use crate::{
    command::{DatasetArg, EngineArg},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RecommendArg {
    #[clap(flatten)]
    dataset: DatasetArg,
    #[clap(flatten)]
    engine: EngineArg,
    /// Number of countries to recommend
    #[arg(long, default_value_t = 3)]
    top_k: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Free-text description of the desired country
    text: String,
}

pub(crate) fn run(arg: &RecommendArg) -> anyhow::Result<()> {
    let RecommendArg {
        dataset,
        engine,
        top_k,
        output,
        text,
    } = arg;
    let recommender = util::load_recommender(
        &dataset.data,
        &dataset.prepare_options(),
        engine.config(*top_k)?,
    )?;

    let result = recommender.recommend(text)?;
    tracing::info!(
        best_match = %result.best_match.name,
        cluster = result.best_match.cluster,
        "recommendation ready"
    );
    util::save_json(&result, output.as_deref())?;
    Ok(())
}
