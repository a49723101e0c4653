//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the configured level is used as the
//! filter directive.

use almanac_domain::{AlmanacError, LogFormat, LoggingConfig, Result};
use tracing_subscriber::EnvFilter;

/// Resolve the log filter from `RUST_LOG` or the configured level.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(&config.level).map_err(|err| {
            AlmanacError::Config(format!("invalid log level '{}': {err}", config.level))
        })
    })
}

/// Install the global tracing subscriber.
///
/// Fails if the filter is invalid or a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(build_filter(config)?).with_target(true);

    let installed = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };

    installed.map_err(|err| AlmanacError::Internal(format!("failed to install tracing subscriber: {err}")))
}
