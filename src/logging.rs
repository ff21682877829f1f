//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; a driver or test harness calls
//! [`init`] once to print them.

use crate::config::{LogFormat, LoggingConfig};
use std::env;

/// Environment variable overriding `logging.level`
pub const LEVEL_ENV: &str = "RAM_IR_LOG";

/// Install a global fmt subscriber writing to stderr.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init(config: &LoggingConfig) -> bool {
    let level = env::var(LEVEL_ENV).unwrap_or_else(|_| config.level.clone());

    let filter = || {
        tracing_subscriber::EnvFilter::try_new(&level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    let base = || {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .with_target(true)
    };

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = match config.format {
        LogFormat::Json => Box::new(base().json().finish()),
        LogFormat::Text => Box::new(base().compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_refused() {
        let config = LoggingConfig::default();
        let _ = init(&config);
        assert!(!init(&config));
    }
}
