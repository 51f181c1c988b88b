//! Logger setup. Everything logs through the `log` facade; `env_logger` is
//! the sink. `RUST_LOG` wins over the configured level.

use env_logger::{Builder, Env};
use log::LevelFilter;

use crate::config::LoggingConfig;

/// Install the global logger. Returns false if one was already installed.
pub fn init(config: &LoggingConfig) -> bool {
    let env = Env::default().default_filter_or(config.level.clone());
    Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

/// Logger for tests: captured by the test harness, safe to call repeatedly
pub fn init_for_tests() {
    let _ = Builder::new()
        .is_test(true)
        .filter_level(LevelFilter::Debug)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_for_tests_is_idempotent() {
        init_for_tests();
        init_for_tests();
        // A second global logger can never be installed
        assert!(!init(&LoggingConfig::default()));
    }
}
