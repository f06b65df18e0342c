//! Structured logging.
//!
//! Installs a `tracing-subscriber` registry driven by the
//! `[observability]` config section. `RUST_LOG` overrides the configured
//! level when set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Build the filter used when `RUST_LOG` is absent.
pub fn default_filter(config: &ObservabilityConfig) -> String {
    format!("ajos_guard={}", config.log_level)
}

/// Initialize the global subscriber.
///
/// Returns `false` if a subscriber was already installed (for example by a
/// test harness), in which case the existing one is kept.
pub fn init(config: &ObservabilityConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };

    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_uses_configured_level() {
        let config = ObservabilityConfig {
            log_level: "debug".to_string(),
            json_logs: false,
        };
        assert_eq!(default_filter(&config), "ajos_guard=debug");
    }
}
