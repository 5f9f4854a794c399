use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{DemoError, Result};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Default filter when `RUST_LOG` is unset. Command output goes to stdout,
/// logs to stderr, so only warnings show by default.
const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber: `RUST_LOG`-driven, human or JSON lines.
pub fn init_tracing(json: bool) -> Result<()> {
    INITIALISED.set(()).map_err(|()| DemoError::LoggingInit)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr);
        Registry::default().with(filter).with(layer).init();
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr);
        Registry::default().with(filter).with(layer).init();
    }
    Ok(())
}
