//! Tracing initialization (fmt subscriber with env-filter).
//!
//! Log verbosity is controlled by `RUST_LOG`; the default filter is `info`.
//!
//! ```bash
//! RUST_LOG=debug aquamon -f config.yaml
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the tracing subscriber
///
/// Sets up tracing-subscriber with console output (fmt layer) filtered by
/// `RUST_LOG`, falling back to `info` when the variable is unset or invalid.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");

    Ok(())
}
