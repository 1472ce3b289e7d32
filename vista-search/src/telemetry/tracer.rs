//! Tracing subscriber initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vista_core::{ConfigError, VistaResult};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "vista_search=debug,info";

/// Install the global tracing subscriber.
///
/// Call once at startup, before anything is logged. Events are written as
/// JSON lines to stderr, filtered by `RUST_LOG` (default
/// [`DEFAULT_LOG_FILTER`]). Fails if a global subscriber is already set.
pub fn init_tracing() -> VistaResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| ConfigError::InvalidValue {
            field: "tracing_subscriber".to_string(),
            value: "global".to_string(),
            reason: format!("Failed to init subscriber: {}", e),
        })?;

    tracing::info!(
        service_version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // The first call may lose to another test's subscriber; the second
        // can never succeed.
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }
}
