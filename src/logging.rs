//! Tracing subscriber set-up

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Build the env filter: `RUST_LOG` wins over the configured level
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("boba_map={0},tower_http={0}", config.level)))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config);
    let installed = match config.format.as_str() {
        "json" => fmt().json().with_env_filter(filter).try_init(),
        _ => fmt().pretty().with_env_filter(filter).try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to initialise logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        // another test may have installed a subscriber first
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
