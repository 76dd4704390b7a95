// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::utils::logging::LoggingConfig;

/// Tracing subscriber setup
pub struct TracingLogAdapter;

impl TracingLogAdapter {
    /// Build the filter: RUST_LOG when set, otherwise the configured level
    pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()))
    }

    /// Install the global subscriber, writing to stderr.
    ///
    /// Returns false when a subscriber was already installed.
    pub fn init(config: &LoggingConfig) -> bool {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(Self::env_filter(config))
            .with_writer(std::io::stderr)
            .with_target(false);

        let installed = if config.json {
            builder.json().try_init().is_ok()
        } else {
            builder.try_init().is_ok()
        };

        if installed {
            tracing::debug!(level = ?config.level, json = config.json, "Logging initialized");
        }
        installed
    }
}
