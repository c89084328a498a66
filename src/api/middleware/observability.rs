//! Observability setup.
//!
//! Structured logging through `tracing`. `RUST_LOG` wins when set, otherwise
//! the configured log level applies.

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat};

/// Build the log filter: `RUST_LOG` if present, else `fallback_level`.
pub fn env_filter(fallback_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(fallback_level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_observability(config: &Config) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.log_level))
        .with_writer(std::io::stderr)
        .with_ansi(false); // Disable ANSI colors for log files

    let installed = match config.log_format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Text => builder.try_init().is_ok(),
    };

    if installed {
        info!(
            "Observability initialized (level={}, format={:?})",
            config.log_level, config.log_format
        );
    }
}

/// Flush anything buffered before exit.
pub async fn shutdown_observability() {
    info!("Observability shut down");
}
