use std::path::PathBuf;
use std::process::ExitCode;

use console::style;

use botstrap_core::catalog::{catalog_for, LoadedTemplate, Plugin, Runtime};
use botstrap_core::error::{BotstrapError, Result};
use botstrap_core::prompt::{Prompter, PromptDriver};
use botstrap_core::{generate_project, GenerateOptions};

use crate::cli::NewArgs;
use crate::settings::Settings;

const DEFAULT_PROJECT_NAME: &str = "my-bot";

pub async fn run(settings: &Settings, args: NewArgs) -> Result<ExitCode> {
    let templates = super::load_templates(settings).await?;
    let prompter = Prompter::new(settings.interactive);
    let options = resolve_options(settings, args, &templates, &prompter)?;

    let source = catalog_for(&settings.templates_root);
    let project = generate_project(options, source.as_ref()).await?;

    println!(
        "\n{} Project generated at {}",
        style("✓").green().bold(),
        style(project.destination.display()).cyan()
    );
    println!(
        "  {} files rendered, {} files copied",
        project.files.rendered_files.len(),
        project.files.copied_files.len()
    );

    Ok(ExitCode::SUCCESS)
}

/// Fill in whatever the command line left out, prompting when allowed.
fn resolve_options<D: PromptDriver>(
    settings: &Settings,
    args: NewArgs,
    templates: &[LoadedTemplate],
    prompter: &Prompter<D>,
) -> Result<GenerateOptions> {
    let project_name = match args.name {
        Some(name) => name,
        None => prompter.text(
            "Project name",
            Some(DEFAULT_PROJECT_NAME),
            Some(DEFAULT_PROJECT_NAME.to_string()),
        )?,
    };
    let project_name = match project_name.trim() {
        "" => DEFAULT_PROJECT_NAME.to_string(),
        trimmed => trimmed.to_string(),
    };

    let template = match args.template {
        Some(template) => template,
        None => {
            let names: Vec<String> = templates.iter().map(|t| t.name().to_string()).collect();
            if names.is_empty() {
                return Err(BotstrapError::UnknownTemplate {
                    name: String::new(),
                    available: "none".into(),
                });
            }
            prompter.select("Template", &names, names.first().cloned())?
        }
    };

    let loaded = templates.iter().find(|t| t.name() == template);
    let runtime = match settings.runtime {
        Some(runtime) => runtime,
        None => {
            let choices: Vec<Runtime> = loaded
                .map(|t| t.manifest.runtimes.clone())
                .unwrap_or_else(|| Runtime::ALL.to_vec());
            prompter.select("Runtime", &choices, choices.first().copied())?
        }
    };

    let plugins = match loaded {
        Some(t) if args.plugins.is_empty() && !t.manifest.plugins.is_empty() => {
            prompter.multi_select::<Plugin>("Plugins", &t.manifest.plugins, Some(Vec::new()))?
        }
        _ => args.plugins,
    };

    let destination = args.dir.unwrap_or_else(|| PathBuf::from(&project_name));

    Ok(GenerateOptions {
        template,
        project_name,
        runtime,
        destination,
        templates_root: settings.templates_root.clone(),
        plugins,
    })
}
