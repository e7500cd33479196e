//! Tracing subscriber initialisation.
//!
//! `RUST_LOG` wins when set. Otherwise the level comes from `--verbose`,
//! then `BOTSTRAP_LOG_LEVEL`, then the user config, then `info`.

use std::io::IsTerminal as _;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use botstrap_core::config::{select_log_level, LogLevel, LOG_LEVEL_ENV};

pub fn init_logging(verbose: bool, config_level: Option<&str>) {
    let env_level = std::env::var(LOG_LEVEL_ENV).ok();
    let level = derive_level(verbose, env_level.as_deref(), config_level);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("botstrap={level},botstrap_core={level}")));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    // Only fails when a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn derive_level(verbose: bool, env_level: Option<&str>, config_level: Option<&str>) -> LogLevel {
    if verbose {
        return LogLevel::Debug;
    }
    select_log_level(env_level.or(config_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_wins() {
        assert_eq!(derive_level(true, Some("error"), Some("warn")), LogLevel::Debug);
    }

    #[test]
    fn env_beats_config() {
        assert_eq!(derive_level(false, Some("WARN"), Some("error")), LogLevel::Warn);
    }

    #[test]
    fn config_then_default() {
        assert_eq!(derive_level(false, None, Some("error")), LogLevel::Error);
        assert_eq!(derive_level(false, None, None), LogLevel::Info);
    }
}
