use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::manifest::{LoadedTemplate, TemplateFileDescriptor, TemplateManifest};
use super::validate::{validate_catalog, ValidateOptions};
use crate::error::{BotstrapError, Result};

/// Name of the manifest file a templates root may carry.
pub const CATALOG_FILE: &str = "catalog.toml";

/// Supplies raw manifests to the validator.
pub trait CatalogSource {
    fn manifests(&self) -> Result<Vec<TemplateManifest>>;
}

/// The templates shipped with botstrap.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinCatalog;

impl CatalogSource for BuiltinCatalog {
    fn manifests(&self) -> Result<Vec<TemplateManifest>> {
        let runtimes = || vec!["deno".to_string(), "node".to_string(), "bun".to_string()];

        Ok(vec![
            TemplateManifest {
                name: "minimal-ts".into(),
                description: "Minimal TypeScript bot with env config and lint/test tasks".into(),
                runtimes: runtimes(),
                plugins: vec![],
                files: vec![
                    TemplateFileDescriptor::with_destination("src/bot.ts.tera", "src/bot.ts"),
                    TemplateFileDescriptor::with_destination("README.md.tera", "README.md"),
                    TemplateFileDescriptor::with_destination("deno.json.tera", "deno.json"),
                    TemplateFileDescriptor::with_destination("package.json.tera", "package.json"),
                    TemplateFileDescriptor::new("tsconfig.json"),
                    TemplateFileDescriptor::new(".env.example"),
                    TemplateFileDescriptor::new(".gitignore"),
                ],
                directory: None,
            },
            TemplateManifest {
                name: "minimal-js".into(),
                description: "Minimal JavaScript bot with JSDoc type hints".into(),
                runtimes: runtimes(),
                plugins: vec![],
                files: vec![
                    TemplateFileDescriptor::with_destination("src/bot.js.tera", "src/bot.js"),
                    TemplateFileDescriptor::with_destination("README.md.tera", "README.md"),
                    TemplateFileDescriptor::with_destination("deno.json.tera", "deno.json"),
                    TemplateFileDescriptor::with_destination("package.json.tera", "package.json"),
                    TemplateFileDescriptor::new(".env.example"),
                    TemplateFileDescriptor::new(".gitignore"),
                ],
                directory: None,
            },
        ])
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    templates: Vec<TemplateManifest>,
}

/// Manifests read from a `catalog.toml` of `[[templates]]` tables.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The catalog file inside a templates root.
    pub fn in_dir(templates_root: &Path) -> Self {
        Self::new(templates_root.join(CATALOG_FILE))
    }
}

impl CatalogSource for FileCatalog {
    fn manifests(&self) -> Result<Vec<TemplateManifest>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no catalog file, catalog is empty");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| BotstrapError::Io {
            context: format!("reading {}", self.path.display()),
            source: e,
        })?;
        let catalog: CatalogFile =
            toml::from_str(&content).map_err(|e| BotstrapError::CatalogParse {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(catalog.templates)
    }
}

/// Pick the catalog for a templates root: its `catalog.toml` when present,
/// otherwise the builtin manifests.
pub fn catalog_for(templates_root: &Path) -> Box<dyn CatalogSource> {
    if templates_root.join(CATALOG_FILE).is_file() {
        Box::new(FileCatalog::in_dir(templates_root))
    } else {
        Box::new(BuiltinCatalog)
    }
}

/// Fetch manifests from `source` and validate them.
pub async fn load_template_catalog(
    source: &dyn CatalogSource,
    options: &ValidateOptions,
) -> Result<Vec<LoadedTemplate>> {
    let manifests = source.manifests()?;
    debug!(count = manifests.len(), "loaded template manifests");
    Ok(validate_catalog(&manifests, options).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::bundled_templates_root;
    use std::fs;

    #[test]
    fn builtin_catalog_lists_minimal_templates() {
        let names: Vec<_> = BuiltinCatalog
            .manifests()
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["minimal-ts", "minimal-js"]);
    }

    #[tokio::test]
    async fn builtin_catalog_matches_bundled_tree() {
        let loaded = load_template_catalog(
            &BuiltinCatalog,
            &ValidateOptions::new(bundled_templates_root()),
        )
        .await
        .unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|t| t.directory.is_dir()));
    }

    #[test]
    fn file_catalog_reads_templates_tables() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CATALOG_FILE),
            r#"
[[templates]]
name = "echo-bot"
description = "Echo bot"
runtimes = ["node"]
plugins = ["auto-retry"]
files = [{ path = "bot.js.tera", destination = "bot.js" }]
"#,
        )
        .unwrap();

        let manifests = FileCatalog::in_dir(dir.path()).manifests().unwrap();
        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].name, "echo-bot");
        assert_eq!(manifests[0].plugins, vec!["auto-retry"]);
        assert_eq!(manifests[0].files[0].destination.as_deref(), Some("bot.js"));
    }

    #[test]
    fn missing_catalog_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileCatalog::in_dir(dir.path()).manifests().unwrap().is_empty());
    }

    #[test]
    fn malformed_catalog_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CATALOG_FILE), "[[templates]\nname = ").unwrap();

        let err = FileCatalog::in_dir(dir.path()).manifests().unwrap_err();
        assert!(matches!(err, BotstrapError::CatalogParse { .. }));
    }

    #[tokio::test]
    async fn catalog_for_prefers_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = catalog_for(dir.path());
        assert_eq!(source.manifests().unwrap().len(), 2);

        fs::write(dir.path().join(CATALOG_FILE), "").unwrap();
        let source = catalog_for(dir.path());
        let loaded = load_template_catalog(source.as_ref(), &ValidateOptions::new(dir.path()))
            .await
            .unwrap();
        assert!(loaded.is_empty());
    }
}
