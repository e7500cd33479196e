#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Why a relative path in a manifest was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathViolation {
    #[error("must be a non-empty string")]
    Empty,

    #[error("must be a relative path")]
    Absolute,

    #[error("may not traverse upwards")]
    TraversesUpwards,

    #[error("contains invalid path segments")]
    EmptySegment,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    #[error("Template name must be a non-empty string")]
    EmptyName,

    #[error("Template name must be kebab-case with lowercase alphanumerics: {value}")]
    #[diagnostic(help("Use lowercase letters, digits and single hyphens, e.g. 'minimal-ts'"))]
    InvalidName { value: String },

    #[error("Duplicate template name detected: {name}")]
    DuplicateName { name: String },

    #[error("Template '{template}' must provide a non-empty description")]
    EmptyDescription { template: String },

    #[error("Template '{template}' must declare at least one runtime")]
    NoRuntimes { template: String },

    #[error("Template '{template}' references unsupported runtime '{runtime}'")]
    #[diagnostic(help("Supported runtimes: deno, node, bun"))]
    UnsupportedRuntime { template: String, runtime: String },

    #[error("Template '{template}' references unsupported plugin '{plugin}'")]
    #[diagnostic(help(
        "Supported plugins: conversations, menu, rate-limiter, i18n, auto-retry, parse-mode"
    ))]
    UnsupportedPlugin { template: String, plugin: String },

    #[error("{label} {violation}")]
    InvalidPath {
        label: String,
        violation: PathViolation,
    },

    #[error("Template directory not found for '{template}': {path}")]
    DirectoryNotFound { template: String, path: PathBuf },

    #[error("Template directory is not a folder for '{template}': {path}")]
    NotADirectory { template: String, path: PathBuf },

    #[error("Template '{template}' must declare at least one file descriptor")]
    NoFiles { template: String },

    #[error("Duplicate file path '{path}' in template '{template}'")]
    DuplicatePath { template: String, path: String },

    #[error("Duplicate file destination '{destination}' in template '{template}'")]
    DuplicateDestination {
        template: String,
        destination: String,
    },

    #[error("Template '{template}' file not found: {path}")]
    FileNotFound { template: String, path: PathBuf },

    #[error("Unable to stat path: {path}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure reported by a [`crate::render::TemplateEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Template(#[from] tera::Error),

    /// A template source, named relative to the views root, failed to parse.
    #[error("Failed to parse template {path}")]
    Parse {
        path: String,
        #[source]
        source: tera::Error,
    },

    #[error("Failed to read template source {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("Template root path is required")]
    MissingTemplateRoot,

    #[error("Destination root path is required")]
    MissingDestinationRoot,

    #[error("Template root not found: {path}")]
    TemplateRootNotFound { path: PathBuf },

    #[error("Template root is not a directory: {path}")]
    TemplateRootNotDirectory { path: PathBuf },

    #[error("Unable to stat path: {path}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template: {path}")]
    #[diagnostic(help("Check your Tera template syntax"))]
    Template {
        path: String,
        #[source]
        source: tera::Error,
    },

    #[error("Unexpected error while rendering template: {path}")]
    Unexpected {
        path: String,
        #[source]
        source: EngineError,
    },

    #[error("Failed to walk template root")]
    Walk {
        #[source]
        source: walkdir::Error,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, Diagnostic)]
pub enum PromptError {
    #[error("Prompt cancelled by user")]
    Cancelled,

    #[error("Interactive prompts disabled and no fallback provided for: {message}")]
    #[diagnostic(help("Pass the value as a command-line option or drop --no-interactive"))]
    Unavailable { message: String },

    #[error("Prompt failed: {message}")]
    Driver {
        message: String,
        #[source]
        source: inquire::InquireError,
    },
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    #[diagnostic(help("Check the TOML syntax in your botstrap config.toml"))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error, Diagnostic)]
pub enum BotstrapError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to parse template catalog {path}")]
    #[diagnostic(help("Each entry must be a [[templates]] table with name, description, runtimes and files"))]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown template '{name}'")]
    #[diagnostic(help("Available templates: {available}"))]
    UnknownTemplate { name: String, available: String },

    #[error("Template '{template}' does not support runtime '{runtime}'")]
    #[diagnostic(help("Supported runtimes for this template: {supported}"))]
    UnsupportedRuntime {
        template: String,
        runtime: String,
        supported: String,
    },

    #[error("Destination directory is not empty: {path}")]
    #[diagnostic(help("Choose a new directory or empty the existing one"))]
    DestinationNotEmpty { path: PathBuf },

    #[error("Failed to serialize templates as JSON")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BotstrapError {
    /// True when the user aborted an interactive prompt.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BotstrapError::Prompt(PromptError::Cancelled))
    }
}

pub type Result<T> = std::result::Result<T, BotstrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_violation_messages_are_labelled() {
        let err = ManifestError::InvalidPath {
            label: "template 'demo' file path".into(),
            violation: PathViolation::TraversesUpwards,
        };
        assert_eq!(
            err.to_string(),
            "template 'demo' file path may not traverse upwards"
        );
    }

    #[test]
    fn path_violations_are_errors_with_fixed_messages() {
        let messages: Vec<String> = [
            PathViolation::Empty,
            PathViolation::Absolute,
            PathViolation::TraversesUpwards,
            PathViolation::EmptySegment,
        ]
        .iter()
        .map(|violation| (violation as &dyn std::error::Error).to_string())
        .collect();
        assert_eq!(
            messages,
            vec![
                "must be a non-empty string",
                "must be a relative path",
                "may not traverse upwards",
                "contains invalid path segments",
            ]
        );
    }

    #[test]
    fn cancelled_prompt_is_detected_through_umbrella_error() {
        let err: BotstrapError = PromptError::Cancelled.into();
        assert!(err.is_cancelled());

        let other: BotstrapError = RenderError::MissingTemplateRoot.into();
        assert!(!other.is_cancelled());
    }

    #[test]
    fn render_error_keeps_engine_cause() {
        let err = RenderError::Template {
            path: "bot.ts.tera".into(),
            source: tera::Error::msg("unexpected end of template"),
        };
        let source = std::error::Error::source(&err).expect("cause");
        assert!(source.to_string().contains("unexpected end of template"));
    }
}
