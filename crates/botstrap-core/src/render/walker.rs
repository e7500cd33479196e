use std::fs::Metadata;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

use super::context::RenderContext;
use super::engine::{TemplateEngine, TeraEngine};
use crate::error::{EngineError, RenderError};

/// Files ending in this suffix are rendered; everything else is copied.
pub const TEMPLATE_EXTENSION: &str = ".tera";

/// Include-only directories used when the caller does not name any.
pub const DEFAULT_PARTIAL_DIRECTORIES: [&str; 2] = ["_partials", "partials"];

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Directory containing the template files.
    pub template_root: PathBuf,
    /// Directory the project is emitted into. Created if missing.
    pub destination_root: PathBuf,
    /// Variables available to templates under `it`. Empty when `None`.
    pub context: Option<RenderContext>,
    /// Directories (relative to `template_root`) whose files are include-only.
    pub partial_directories: Option<Vec<String>>,
}

/// Destination-relative paths of everything written, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    pub rendered_files: Vec<PathBuf>,
    pub copied_files: Vec<PathBuf>,
}

/// Render a template directory with the default Tera engine.
pub async fn render_template_directory(
    options: RenderOptions,
) -> Result<RenderResult, RenderError> {
    let mut engine = TeraEngine::new();
    render_template_directory_with(options, &mut engine).await
}

/// Walk `template_root`, rendering `.tera` files through `engine` and copying
/// the rest byte for byte into `destination_root`.
///
/// Files written before a failure are left in place.
pub async fn render_template_directory_with<E>(
    options: RenderOptions,
    engine: &mut E,
) -> Result<RenderResult, RenderError>
where
    E: TemplateEngine,
{
    let RenderOptions {
        template_root,
        destination_root,
        context,
        partial_directories,
    } = options;

    if template_root.as_os_str().is_empty() {
        return Err(RenderError::MissingTemplateRoot);
    }
    if destination_root.as_os_str().is_empty() {
        return Err(RenderError::MissingDestinationRoot);
    }

    match probe(&template_root).await? {
        None => return Err(RenderError::TemplateRootNotFound { path: template_root }),
        Some(info) if !info.is_dir() => {
            return Err(RenderError::TemplateRootNotDirectory { path: template_root })
        }
        Some(_) => {}
    }

    create_dir_all(&destination_root).await?;

    engine
        .configure(&template_root, TEMPLATE_EXTENSION)
        .map_err(|source| RenderError::Unexpected {
            path: template_root.display().to_string(),
            source,
        })?;

    let partials = normalize_partial_directories(partial_directories);
    let context = context.unwrap_or_default();
    let mut result = RenderResult::default();

    for relative in collect_template_files(template_root.clone()).await? {
        let relative_name = slash_path(&relative);
        if is_in_partial_directory(&relative_name, &partials) {
            debug!(file = %relative_name, "skipping partial");
            continue;
        }

        let output_relative = PathBuf::from(strip_template_extension(&relative_name));
        let destination = destination_root.join(&output_relative);
        if let Some(parent) = destination.parent() {
            create_dir_all(parent).await?;
        }

        if is_template_file(&relative_name) {
            let rendered = render_template_file(engine, &relative_name, &context).await?;
            fs::write(&destination, rendered)
                .await
                .map_err(|e| RenderError::Io {
                    context: format!("writing {}", destination.display()),
                    source: e,
                })?;
            debug!(file = %output_relative.display(), "rendered template");
            result.rendered_files.push(output_relative);
        } else {
            let source = template_root.join(&relative);
            fs::copy(&source, &destination)
                .await
                .map_err(|e| RenderError::Io {
                    context: format!(
                        "copying {} to {}",
                        source.display(),
                        destination.display()
                    ),
                    source: e,
                })?;
            debug!(file = %output_relative.display(), "copied file");
            result.copied_files.push(output_relative);
        }
    }

    Ok(result)
}

async fn render_template_file<E>(
    engine: &mut E,
    template_path: &str,
    context: &RenderContext,
) -> Result<String, RenderError>
where
    E: TemplateEngine,
{
    match engine.render(template_path, context).await {
        Ok(output) => Ok(output.unwrap_or_default()),
        // A broken include is reported under its own name.
        Err(EngineError::Parse { path, source }) => Err(RenderError::Template { path, source }),
        Err(EngineError::Template(source)) => Err(RenderError::Template {
            path: template_path.to_string(),
            source,
        }),
        Err(source) => Err(RenderError::Unexpected {
            path: template_path.to_string(),
            source,
        }),
    }
}

/// Forward-slash form of a relative path, as template names are written.
fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Regular files under `root`, relative to it, in lexical order per directory.
/// Symbolic links are not followed.
async fn collect_template_files(root: PathBuf) -> Result<Vec<PathBuf>, RenderError> {
    tokio::task::spawn_blocking(move || {
        let mut files = Vec::new();
        for entry in WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| RenderError::Walk { source })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&root) {
                files.push(relative.to_path_buf());
            }
        }
        Ok(files)
    })
    .await
    .map_err(|e| RenderError::Io {
        context: "walking template root".into(),
        source: std::io::Error::other(e),
    })?
}

async fn probe(path: &Path) -> Result<Option<Metadata>, RenderError> {
    match fs::metadata(path).await {
        Ok(info) => Ok(Some(info)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RenderError::Stat {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

async fn create_dir_all(path: &Path) -> Result<(), RenderError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| RenderError::Io {
            context: format!("creating directory {}", path.display()),
            source: e,
        })
}

fn normalize_partial_directories(directories: Option<Vec<String>>) -> Vec<String> {
    match directories {
        Some(directories) if !directories.is_empty() => directories
            .into_iter()
            .map(|dir| dir.replace('\\', "/").trim_matches('/').to_string())
            .filter(|dir| !dir.is_empty())
            .collect(),
        _ => DEFAULT_PARTIAL_DIRECTORIES
            .iter()
            .map(|dir| dir.to_string())
            .collect(),
    }
}

/// A partial directory matches at any depth of the relative path.
fn is_in_partial_directory(relative_path: &str, partials: &[String]) -> bool {
    partials.iter().any(|dir| {
        relative_path == dir
            || relative_path.starts_with(&format!("{dir}/"))
            || relative_path.contains(&format!("/{dir}/"))
    })
}

fn is_template_file(relative_path: &str) -> bool {
    let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    file_name.len() > TEMPLATE_EXTENSION.len() && file_name.ends_with(TEMPLATE_EXTENSION)
}

fn strip_template_extension(relative_path: &str) -> &str {
    if is_template_file(relative_path) {
        &relative_path[..relative_path.len() - TEMPLATE_EXTENSION.len()]
    } else {
        relative_path
    }
}
