use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Target execution environment a template supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    Deno,
    Node,
    Bun,
}

impl Runtime {
    pub const ALL: [Runtime; 3] = [Runtime::Deno, Runtime::Node, Runtime::Bun];

    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Deno => "deno",
            Runtime::Node => "node",
            Runtime::Bun => "bun",
        }
    }
}

/// Optional grammY capability a template may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Plugin {
    Conversations,
    Menu,
    RateLimiter,
    I18n,
    AutoRetry,
    ParseMode,
}

impl Plugin {
    pub const ALL: [Plugin; 6] = [
        Plugin::Conversations,
        Plugin::Menu,
        Plugin::RateLimiter,
        Plugin::I18n,
        Plugin::AutoRetry,
        Plugin::ParseMode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Plugin::Conversations => "conversations",
            Plugin::Menu => "menu",
            Plugin::RateLimiter => "rate-limiter",
            Plugin::I18n => "i18n",
            Plugin::AutoRetry => "auto-retry",
            Plugin::ParseMode => "parse-mode",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Runtime {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Runtime::ALL
            .into_iter()
            .find(|runtime| runtime.as_str() == s)
            .ok_or_else(|| UnknownTag {
                kind: "runtime",
                value: s.to_string(),
            })
    }
}

impl FromStr for Plugin {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Plugin::ALL
            .into_iter()
            .find(|plugin| plugin.as_str() == s)
            .ok_or_else(|| UnknownTag {
                kind: "plugin",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TemplateFileDescriptor {
    /// Source path relative to the template directory.
    pub path: String,
    /// Where the file lands in the generated project, when it differs from `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl TemplateFileDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            destination: None,
        }
    }

    pub fn with_destination(path: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            destination: Some(destination.into()),
        }
    }
}

/// Author-supplied description of one template, as found in a catalog.
///
/// Runtime and plugin tags stay as plain strings here so that validation can
/// name the offending value when a tag is not recognised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TemplateManifest {
    pub name: String,
    pub description: String,

    #[serde(default)]
    pub runtimes: Vec<String>,

    #[serde(default)]
    pub plugins: Vec<String>,

    #[serde(default)]
    pub files: Vec<TemplateFileDescriptor>,

    /// Directory relative to the templates root. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

/// A manifest after validation: trimmed, de-duplicated and typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedManifest {
    pub name: String,
    pub description: String,
    pub runtimes: Vec<Runtime>,
    pub plugins: Vec<Plugin>,
    pub files: Vec<TemplateFileDescriptor>,
    pub directory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedTemplateFile {
    pub descriptor: TemplateFileDescriptor,
    pub absolute_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedTemplate {
    pub manifest: NormalizedManifest,
    /// Absolute path of the template's source folder.
    pub directory: PathBuf,
    pub files: Vec<LoadedTemplateFile>,
}

impl LoadedTemplate {
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn supports(&self, runtime: Runtime) -> bool {
        self.manifest.runtimes.contains(&runtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags() {
        assert_eq!("bun".parse::<Runtime>().unwrap(), Runtime::Bun);
        assert_eq!("rate-limiter".parse::<Plugin>().unwrap(), Plugin::RateLimiter);
        assert_eq!("i18n".parse::<Plugin>().unwrap(), Plugin::I18n);
    }

    #[test]
    fn rejects_unknown_tags_by_name() {
        let err = "python".parse::<Runtime>().unwrap_err();
        assert_eq!(err.to_string(), "unknown runtime 'python'");
        assert!("Deno".parse::<Runtime>().is_err());
    }

    #[test]
    fn serde_names_match_tag_strings() {
        for plugin in Plugin::ALL {
            let json = serde_json::to_string(&plugin).unwrap();
            assert_eq!(json, format!("\"{}\"", plugin.as_str()));
        }
        for runtime in Runtime::ALL {
            let json = serde_json::to_string(&runtime).unwrap();
            assert_eq!(json, format!("\"{}\"", runtime.as_str()));
        }
    }

    #[test]
    fn manifest_defaults_optional_fields() {
        let manifest: TemplateManifest = toml::from_str(
            r#"
name = "minimal-ts"
description = "Minimal bot"
runtimes = ["deno"]
files = [{ path = "bot.ts.tera" }]
"#,
        )
        .unwrap();
        assert!(manifest.plugins.is_empty());
        assert!(manifest.directory.is_none());
        assert_eq!(manifest.files[0], TemplateFileDescriptor::new("bot.ts.tera"));
    }
}
