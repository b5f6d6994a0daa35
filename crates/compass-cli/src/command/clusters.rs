use std::path::PathBuf;

use crate::{command::DatasetArg, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ClustersArg {
    #[clap(flatten)]
    pub(super) dataset: DatasetArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ClustersArg) -> anyhow::Result<()> {
    let ClustersArg { dataset, output } = arg;
    let prepared = util::load_dataset(&dataset.data, &dataset.prepare_options())?;

    let summaries = prepared.cluster_summaries();
    for summary in &summaries {
        tracing::info!(
            cluster = summary.cluster,
            size = summary.size,
            "cluster"
        );
    }
    util::save_json(&summaries, output.as_deref())?;
    Ok(())
}
