pub mod user;

use std::fmt;

pub use user::{load_user_config, load_user_config_from, UserConfig};

/// Environment variable consulted for the log level.
pub const LOG_LEVEL_ENV: &str = "BOTSTRAP_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a configured level name to a [`LogLevel`], case-insensitively.
///
/// Missing or unrecognised values fall back to `info`.
pub fn select_log_level(value: Option<&str>) -> LogLevel {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("debug") => LogLevel::Debug,
        Some("warn") => LogLevel::Warn,
        Some("error") => LogLevel::Error,
        _ => LogLevel::Info,
    }
}
