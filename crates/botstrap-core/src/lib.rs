pub mod catalog;
pub mod config;
pub mod doctor;
pub mod error;
pub mod listing;
pub mod prompt;
pub mod render;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::{load_template_catalog, CatalogSource, Plugin, Runtime, ValidateOptions};
use crate::error::{BotstrapError, Result};
use crate::render::{project_context, render_template_directory, RenderOptions, RenderResult};

/// Options for the `generate_project` operation.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Name of a template in the catalog.
    pub template: String,
    pub project_name: String,
    pub runtime: Runtime,
    /// Output directory. Must be missing or empty.
    pub destination: PathBuf,
    /// Directory holding the template folders.
    pub templates_root: PathBuf,
    pub plugins: Vec<Plugin>,
}

#[derive(Debug, Clone)]
pub struct GeneratedProject {
    pub template: String,
    pub destination: PathBuf,
    pub files: RenderResult,
}

/// Generate a bot project from a catalog template.
pub async fn generate_project(
    options: GenerateOptions,
    source: &dyn CatalogSource,
) -> Result<GeneratedProject> {
    // 1. Load and validate the catalog
    let templates =
        load_template_catalog(source, &ValidateOptions::new(&options.templates_root)).await?;

    // 2. Select the template
    let template = templates
        .iter()
        .find(|t| t.name() == options.template)
        .ok_or_else(|| BotstrapError::UnknownTemplate {
            name: options.template.clone(),
            available: templates
                .iter()
                .map(|t| t.name())
                .collect::<Vec<_>>()
                .join(", "),
        })?;

    if !template.supports(options.runtime) {
        return Err(BotstrapError::UnsupportedRuntime {
            template: template.name().to_string(),
            runtime: options.runtime.to_string(),
            supported: template
                .manifest
                .runtimes
                .iter()
                .map(Runtime::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    // 3. Check the destination
    if has_contents(&options.destination).await? {
        return Err(BotstrapError::DestinationNotEmpty {
            path: options.destination,
        });
    }

    // 4. Render
    let context = project_context(
        &options.project_name,
        options.runtime,
        template.name(),
        &options.plugins,
    );
    debug!(template = template.name(), directory = %template.directory.display(), "rendering template");
    let files = render_template_directory(RenderOptions {
        template_root: template.directory.clone(),
        destination_root: options.destination.clone(),
        context: Some(context),
        partial_directories: None,
    })
    .await?;

    info!(
        rendered = files.rendered_files.len(),
        copied = files.copied_files.len(),
        "project generated"
    );

    Ok(GeneratedProject {
        template: template.name().to_string(),
        destination: options.destination,
        files,
    })
}

/// An existing directory with at least one entry. A missing path is empty.
async fn has_contents(path: &Path) -> Result<bool> {
    let mut entries = match tokio::fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(BotstrapError::Io {
                context: format!("reading destination {}", path.display()),
                source: e,
            })
        }
    };
    let first = entries.next_entry().await.map_err(|e| BotstrapError::Io {
        context: format!("reading destination {}", path.display()),
        source: e,
    })?;
    Ok(first.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BuiltinCatalog, TemplateFileDescriptor, TemplateManifest};
    use std::fs;

    struct OneTemplate(TemplateManifest);

    impl CatalogSource for OneTemplate {
        fn manifests(&self) -> Result<Vec<TemplateManifest>> {
            Ok(vec![self.0.clone()])
        }
    }

    fn echo_catalog(root: &Path) -> OneTemplate {
        fs::create_dir_all(root.join("echo")).unwrap();
        fs::write(
            root.join("echo/bot.js.tera"),
            "// {{ it.project_name }} on {{ it.runtime }} with {{ it.plugins | join(sep=\",\") }}\n",
        )
        .unwrap();
        OneTemplate(TemplateManifest {
            name: "echo".into(),
            description: "Echo bot".into(),
            runtimes: vec!["node".into()],
            plugins: vec!["menu".into()],
            files: vec![TemplateFileDescriptor::with_destination("bot.js.tera", "bot.js")],
            directory: Some("echo".into()),
        })
    }

    fn options(root: &Path, destination: &Path) -> GenerateOptions {
        GenerateOptions {
            template: "echo".into(),
            project_name: "my-bot".into(),
            runtime: Runtime::Node,
            destination: destination.to_path_buf(),
            templates_root: root.to_path_buf(),
            plugins: vec![Plugin::Menu, Plugin::AutoRetry],
        }
    }

    #[tokio::test]
    async fn renders_selected_template() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let destination = out.path().join("my-bot");
        let catalog = echo_catalog(root.path());

        let project = generate_project(options(root.path(), &destination), &catalog)
            .await
            .unwrap();

        assert_eq!(project.template, "echo");
        assert_eq!(project.files.rendered_files, vec![PathBuf::from("bot.js")]);
        assert_eq!(
            fs::read_to_string(destination.join("bot.js")).unwrap(),
            "// my-bot on node with menu,auto-retry\n"
        );
    }

    #[tokio::test]
    async fn unknown_template_lists_available() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let catalog = echo_catalog(root.path());

        let err = generate_project(
            GenerateOptions {
                template: "nope".into(),
                ..options(root.path(), &out.path().join("x"))
            },
            &catalog,
        )
        .await
        .unwrap_err();

        assert!(
            matches!(err, BotstrapError::UnknownTemplate { ref name, ref available } if name == "nope" && available == "echo")
        );
    }

    #[tokio::test]
    async fn rejects_unsupported_runtime() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let catalog = echo_catalog(root.path());

        let err = generate_project(
            GenerateOptions {
                runtime: Runtime::Deno,
                ..options(root.path(), &out.path().join("x"))
            },
            &catalog,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BotstrapError::UnsupportedRuntime { ref supported, .. } if supported == "node"));
        assert!(!out.path().join("x").exists());
    }

    #[tokio::test]
    async fn refuses_non_empty_destination() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(out.path().join("existing.txt"), "keep").unwrap();
        let catalog = echo_catalog(root.path());

        let err = generate_project(options(root.path(), out.path()), &catalog)
            .await
            .unwrap_err();

        assert!(matches!(err, BotstrapError::DestinationNotEmpty { .. }));
        assert!(!out.path().join("bot.js").exists());
    }

    #[tokio::test]
    async fn empty_destination_is_accepted() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let catalog = echo_catalog(root.path());

        generate_project(options(root.path(), out.path()), &catalog)
            .await
            .unwrap();
        assert!(out.path().join("bot.js").is_file());
    }

    #[tokio::test]
    async fn invalid_catalog_stops_generation() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let err = generate_project(
            GenerateOptions {
                template: "minimal-ts".into(),
                ..options(root.path(), &out.path().join("x"))
            },
            &BuiltinCatalog,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BotstrapError::Manifest(_)));
    }
}
