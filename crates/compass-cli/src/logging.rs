use tracing_subscriber::{EnvFilter, fmt};

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`.
pub(crate) fn init(default_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;
    Ok(())
}
