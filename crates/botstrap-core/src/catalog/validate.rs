use std::collections::HashSet;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;
use tracing::debug;

use super::manifest::{
    LoadedTemplate, LoadedTemplateFile, NormalizedManifest, Plugin, Runtime,
    TemplateFileDescriptor, TemplateManifest,
};
use super::path::normalize_relative_path;
use crate::error::ManifestError;

/// Options for [`validate_catalog`].
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Absolute templates root each manifest directory is joined to.
    pub base_directory: PathBuf,
    /// Check that every declared file exists and is a regular file.
    pub validate_files: bool,
}

impl ValidateOptions {
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
            validate_files: true,
        }
    }

    pub fn validate_files(mut self, validate_files: bool) -> Self {
        self.validate_files = validate_files;
        self
    }
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self::new(super::bundled_templates_root())
    }
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern must compile")
    })
}

/// Validate every manifest in order and resolve it against the templates root.
///
/// Fails on the first invalid manifest; nothing is written to disk.
pub async fn validate_catalog(
    manifests: &[TemplateManifest],
    options: &ValidateOptions,
) -> Result<Vec<LoadedTemplate>, ManifestError> {
    let mut seen_names = HashSet::new();
    let mut results = Vec::with_capacity(manifests.len());

    for manifest in manifests {
        let name = validate_name(&manifest.name)?;
        if !seen_names.insert(name.clone()) {
            return Err(ManifestError::DuplicateName { name });
        }

        let description = validate_description(&manifest.description, &name)?;
        let runtimes = validate_runtimes(&manifest.runtimes, &name)?;
        let plugins = validate_plugins(&manifest.plugins, &name)?;

        let directory_segment = validate_relative_path(
            manifest.directory.as_deref().unwrap_or(&name),
            || format!("template '{name}' directory"),
        )?;
        let template_directory = options.base_directory.join(&directory_segment);
        match probe(&template_directory).await? {
            None => {
                return Err(ManifestError::DirectoryNotFound {
                    template: name,
                    path: template_directory,
                })
            }
            Some(info) if !info.is_dir() => {
                return Err(ManifestError::NotADirectory {
                    template: name,
                    path: template_directory,
                })
            }
            Some(_) => {}
        }

        let files = validate_file_descriptors(
            &manifest.files,
            &template_directory,
            options.validate_files,
            &name,
        )
        .await?;

        debug!(
            template = %name,
            directory = %template_directory.display(),
            files = files.len(),
            "validated template manifest"
        );

        results.push(LoadedTemplate {
            manifest: NormalizedManifest {
                name,
                description,
                runtimes,
                plugins,
                files: files.iter().map(|file| file.descriptor.clone()).collect(),
                directory: directory_segment,
            },
            directory: template_directory,
            files,
        });
    }

    Ok(results)
}

async fn validate_file_descriptors(
    descriptors: &[TemplateFileDescriptor],
    template_directory: &Path,
    validate_existence: bool,
    template: &str,
) -> Result<Vec<LoadedTemplateFile>, ManifestError> {
    if descriptors.is_empty() {
        return Err(ManifestError::NoFiles {
            template: template.to_string(),
        });
    }

    let mut seen_paths = HashSet::new();
    let mut seen_destinations = HashSet::new();
    let mut files = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        let path = validate_relative_path(&descriptor.path, || {
            format!("template '{template}' file path")
        })?;
        if !seen_paths.insert(path.clone()) {
            return Err(ManifestError::DuplicatePath {
                template: template.to_string(),
                path,
            });
        }

        let destination = match descriptor.destination.as_deref() {
            Some(raw) => {
                let destination = validate_relative_path(raw, || {
                    format!("template '{template}' file destination")
                })?;
                if !seen_destinations.insert(destination.clone()) {
                    return Err(ManifestError::DuplicateDestination {
                        template: template.to_string(),
                        destination,
                    });
                }
                Some(destination)
            }
            None => None,
        };

        let absolute_path = template_directory.join(&path);
        if validate_existence {
            let is_file = probe(&absolute_path)
                .await?
                .is_some_and(|info| info.is_file());
            if !is_file {
                return Err(ManifestError::FileNotFound {
                    template: template.to_string(),
                    path: absolute_path,
                });
            }
        }

        files.push(LoadedTemplateFile {
            descriptor: TemplateFileDescriptor { path, destination },
            absolute_path,
        });
    }

    Ok(files)
}

fn validate_name(value: &str) -> Result<String, ManifestError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(ManifestError::EmptyName);
    }
    if !slug_pattern().is_match(normalized) {
        return Err(ManifestError::InvalidName {
            value: value.to_string(),
        });
    }
    Ok(normalized.to_string())
}

fn validate_description(value: &str, template: &str) -> Result<String, ManifestError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ManifestError::EmptyDescription {
            template: template.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn validate_runtimes(values: &[String], template: &str) -> Result<Vec<Runtime>, ManifestError> {
    if values.is_empty() {
        return Err(ManifestError::NoRuntimes {
            template: template.to_string(),
        });
    }

    let mut runtimes = Vec::new();
    for value in values {
        let runtime: Runtime = value
            .parse()
            .map_err(|_| ManifestError::UnsupportedRuntime {
                template: template.to_string(),
                runtime: value.clone(),
            })?;
        if !runtimes.contains(&runtime) {
            runtimes.push(runtime);
        }
    }
    Ok(runtimes)
}

fn validate_plugins(values: &[String], template: &str) -> Result<Vec<Plugin>, ManifestError> {
    let mut plugins = Vec::new();
    for value in values {
        let plugin: Plugin = value
            .parse()
            .map_err(|_| ManifestError::UnsupportedPlugin {
                template: template.to_string(),
                plugin: value.clone(),
            })?;
        if !plugins.contains(&plugin) {
            plugins.push(plugin);
        }
    }
    Ok(plugins)
}

fn validate_relative_path(
    value: &str,
    label: impl FnOnce() -> String,
) -> Result<String, ManifestError> {
    normalize_relative_path(value).map_err(|violation| ManifestError::InvalidPath {
        label: label(),
        violation,
    })
}

/// Stat `path`, treating "not found" as `None`.
async fn probe(path: &Path) -> Result<Option<Metadata>, ManifestError> {
    match tokio::fs::metadata(path).await {
        Ok(info) => Ok(Some(info)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ManifestError::Stat {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
