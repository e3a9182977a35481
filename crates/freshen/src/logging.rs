use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Logs to stderr. `RUST_LOG` applies unless `verbose` forces `debug`.
pub fn init(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_new("debug")?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}
