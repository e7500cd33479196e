use serde::Serialize;

use crate::catalog::{LoadedTemplate, Plugin, Runtime, TemplateFileDescriptor};
use crate::error::{BotstrapError, Result};

pub const EMPTY_CATALOG_MESSAGE: &str = "No templates available.";

const MIN_NAME_WIDTH: usize = 15;
const DESCRIPTION_WIDTH: usize = 40;
const RUNTIMES_WIDTH: usize = 16;

#[derive(Serialize)]
struct TemplateEntry<'a> {
    name: &'a str,
    description: &'a str,
    runtimes: &'a [Runtime],
    plugins: &'a [Plugin],
    directory: &'a str,
    files: &'a [TemplateFileDescriptor],
}

/// Human-readable table of templates.
pub fn format_template_list(templates: &[LoadedTemplate]) -> String {
    if templates.is_empty() {
        return EMPTY_CATALOG_MESSAGE.to_string();
    }

    let name_width = templates
        .iter()
        .map(|t| t.manifest.name.len())
        .max()
        .unwrap_or(0)
        .max(MIN_NAME_WIDTH);

    let header = format!(
        "{:<name_width$}  {:<DESCRIPTION_WIDTH$}  {:<RUNTIMES_WIDTH$}  Plugins",
        "Template Name", "Description", "Runtimes"
    );
    let separator = "-".repeat(header.len());

    let mut lines = vec!["Available Templates:".to_string(), String::new(), header, separator];
    for template in templates {
        let manifest = &template.manifest;
        let runtimes = join_tags(manifest.runtimes.iter().map(Runtime::as_str));
        let plugins = if manifest.plugins.is_empty() {
            "none".to_string()
        } else {
            join_tags(manifest.plugins.iter().map(Plugin::as_str))
        };
        lines.push(format!(
            "{:<name_width$}  {:<DESCRIPTION_WIDTH$}  {:<RUNTIMES_WIDTH$}  {}",
            manifest.name, manifest.description, runtimes, plugins
        ));
    }

    lines.join("\n")
}

/// Pretty-printed JSON array of templates.
pub fn format_template_json(templates: &[LoadedTemplate]) -> Result<String> {
    let entries: Vec<_> = templates
        .iter()
        .map(|t| TemplateEntry {
            name: &t.manifest.name,
            description: &t.manifest.description,
            runtimes: &t.manifest.runtimes,
            plugins: &t.manifest.plugins,
            directory: &t.manifest.directory,
            files: &t.manifest.files,
        })
        .collect();
    serde_json::to_string_pretty(&entries).map_err(|e| BotstrapError::Json { source: e })
}

fn join_tags<'a>(tags: impl Iterator<Item = &'a str>) -> String {
    tags.collect::<Vec<_>>().join(", ")
}
