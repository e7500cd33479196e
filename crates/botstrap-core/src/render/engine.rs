use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;
use tera::Tera;
use tracing::debug;

use super::context::{build_context, RenderContext};
use crate::error::EngineError;

/// What the directory renderer needs from a templating engine.
///
/// `render` and `render_str` may return `None` when an engine produces no
/// output; the renderer writes an empty file in that case.
pub trait TemplateEngine: Send {
    /// Root template lookups at `views`. A name without `default_extension`
    /// resolves to the file that carries it.
    fn configure(&mut self, views: &Path, default_extension: &str) -> Result<(), EngineError>;

    /// Render the template stored at `template_path`, relative to the views root.
    fn render(
        &mut self,
        template_path: &str,
        context: &RenderContext,
    ) -> impl Future<Output = Result<Option<String>, EngineError>> + Send;

    fn render_str(
        &mut self,
        template: &str,
        context: &RenderContext,
    ) -> impl Future<Output = Result<Option<String>, EngineError>> + Send;

    fn read_file(&self, path: &Path) -> impl Future<Output = Result<String, EngineError>> + Send;
}

/// [`TemplateEngine`] backed by Tera.
///
/// Templates are loaded on first use: the requested file plus whatever it
/// includes, extends or imports, each read through [`TemplateEngine::read_file`].
/// Every loaded file is registered with and without its extension, so
/// `{% include "_partials/header" %}` works from any file. Files nobody
/// references are never parsed.
pub struct TeraEngine {
    views: Option<PathBuf>,
    extension: String,
    tera: Tera,
    registered: HashSet<String>,
}

impl Default for TeraEngine {
    fn default() -> Self {
        Self {
            views: None,
            extension: String::new(),
            tera: empty_tera(),
            registered: HashSet::new(),
        }
    }
}

impl TeraEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `names` and everything they reference that is not loaded yet.
    ///
    /// Dependencies are registered before their dependents. A parse failure
    /// names the file that failed.
    async fn load(&mut self, names: Vec<String>) -> Result<(), EngineError> {
        let mut pending = names;
        let mut queued = HashSet::new();
        let mut sources = Vec::new();

        while let Some(name) = pending.pop() {
            if self.registered.contains(&name) || !queued.insert(name.clone()) {
                continue;
            }
            let Some((file_name, path)) = self.resolve(&name).await else {
                debug!(template = %name, "no template file to load");
                continue;
            };
            let source = self.read_file(&path).await?;
            pending.extend(referenced_templates(&source));
            sources.push((name, file_name, source));
        }

        for (name, file_name, source) in sources.into_iter().rev() {
            let mut aliases = vec![file_name.clone()];
            if let Some(alias) = self.strip_extension(&file_name) {
                aliases.push(alias.to_string());
            }
            if !aliases.contains(&name) {
                aliases.push(name);
            }

            for alias in aliases {
                if self.registered.contains(&alias) {
                    continue;
                }
                self.tera
                    .add_raw_template(&alias, &source)
                    .map_err(|source| EngineError::Parse {
                        path: file_name.clone(),
                        source,
                    })?;
                self.registered.insert(alias);
            }
            debug!(template = %file_name, "loaded template");
        }

        Ok(())
    }

    /// File backing a template name: `name` plus the default extension,
    /// else `name` itself.
    async fn resolve(&self, name: &str) -> Option<(String, PathBuf)> {
        let views = self.views.as_deref()?;

        let mut candidates = Vec::with_capacity(2);
        if !self.extension.is_empty() && !name.ends_with(self.extension.as_str()) {
            candidates.push(format!("{name}{}", self.extension));
        }
        candidates.push(name.to_string());

        for candidate in candidates {
            let path = views.join(&candidate);
            let is_file = tokio::fs::metadata(&path)
                .await
                .is_ok_and(|info| info.is_file());
            if is_file {
                return Some((candidate, path));
            }
        }
        None
    }

    fn strip_extension<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        if self.extension.is_empty() {
            return None;
        }
        file_name
            .strip_suffix(self.extension.as_str())
            .filter(|alias| !alias.is_empty() && !alias.ends_with('/'))
    }
}

impl TemplateEngine for TeraEngine {
    fn configure(&mut self, views: &Path, default_extension: &str) -> Result<(), EngineError> {
        self.views = Some(views.to_path_buf());
        self.extension = default_extension.to_string();
        self.tera = empty_tera();
        self.registered.clear();
        Ok(())
    }

    async fn render(
        &mut self,
        template_path: &str,
        context: &RenderContext,
    ) -> Result<Option<String>, EngineError> {
        self.load(vec![template_path.to_string()]).await?;
        let context = build_context(context);
        Ok(Some(self.tera.render(template_path, &context)?))
    }

    async fn render_str(
        &mut self,
        template: &str,
        context: &RenderContext,
    ) -> Result<Option<String>, EngineError> {
        self.load(referenced_templates(template)).await?;
        let context = build_context(context);
        Ok(Some(self.tera.render_str(template, &context)?))
    }

    async fn read_file(&self, path: &Path) -> Result<String, EngineError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EngineError::Read {
                path: path.to_path_buf(),
                source: e,
            })
    }
}

fn empty_tera() -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"\{%-?\s*(?:include|extends|import)\s+(?:"([^"]+)"|'([^']+)')"#)
            .expect("reference pattern must compile")
    })
}

/// Template names a source pulls in through `include`, `extends` or `import`.
fn referenced_templates(source: &str) -> Vec<String> {
    reference_pattern()
        .captures_iter(source)
        .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|name| name.as_str().to_string())
        .collect()
}
