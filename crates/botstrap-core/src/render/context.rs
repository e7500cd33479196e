use std::collections::BTreeMap;

use tera::{Context, Value};

use crate::catalog::{Plugin, Runtime};

/// Variables handed to templates.
pub type RenderContext = BTreeMap<String, Value>;

/// Top-level name templates read their variables through (`{{ it.project_name }}`).
pub const CONTEXT_BINDING: &str = "it";

pub fn build_context(variables: &RenderContext) -> Context {
    let mut context = Context::new();
    context.insert(CONTEXT_BINDING, variables);
    context
}

/// The variables a generated bot project is rendered with.
pub fn project_context(
    project_name: &str,
    runtime: Runtime,
    template: &str,
    plugins: &[Plugin],
) -> RenderContext {
    let mut variables = RenderContext::new();
    variables.insert("project_name".into(), Value::String(project_name.into()));
    variables.insert("runtime".into(), Value::String(runtime.as_str().into()));
    variables.insert("template".into(), Value::String(template.into()));
    variables.insert(
        "plugins".into(),
        Value::Array(
            plugins
                .iter()
                .map(|plugin| Value::String(plugin.as_str().into()))
                .collect(),
        ),
    );
    variables
}
