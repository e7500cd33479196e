use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::Runtime;
use crate::error::ConfigError;

/// User-level configuration loaded from `~/.config/botstrap/config.toml`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Templates root used instead of the bundled one. It should carry a
    /// `catalog.toml`.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    /// Runtime preselected when `--runtime` is not given.
    #[serde(default)]
    pub default_runtime: Option<Runtime>,

    /// Set to `false` to never prompt.
    #[serde(default)]
    pub interactive: Option<bool>,

    #[serde(default)]
    pub log_level: Option<String>,
}

/// Get the path to the user config file.
fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("botstrap").join("config.toml"))
}

/// Load user configuration from the XDG config directory.
///
/// Returns `Ok(None)` if the config file does not exist.
/// Returns `Err` if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<Option<UserConfig>, ConfigError> {
    match config_path() {
        Some(path) => load_user_config_from(&path),
        None => Ok(None),
    }
}

pub fn load_user_config_from(path: &Path) -> Result<Option<UserConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: UserConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_user_config() {
        let toml_str = r#"
templates_dir = "/opt/bot-templates"
default_runtime = "bun"
interactive = false
log_level = "debug"
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.templates_dir.as_deref(),
            Some(Path::new("/opt/bot-templates"))
        );
        assert_eq!(config.default_runtime, Some(Runtime::Bun));
        assert_eq!(config.interactive, Some(false));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn parse_empty_config() {
        let config: UserConfig = toml::from_str("").unwrap();
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn unknown_runtime_is_rejected() {
        let result: std::result::Result<UserConfig, _> =
            toml::from_str("default_runtime = \"python\"");
        assert!(result.is_err());
    }

    #[test]
    fn load_from_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_user_config_from(&dir.path().join("config.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn load_from_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid [[ toml").unwrap();

        let err = load_user_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
