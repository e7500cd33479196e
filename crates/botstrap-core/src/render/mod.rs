pub mod context;
pub mod engine;
pub mod walker;

pub use context::{build_context, project_context, RenderContext, CONTEXT_BINDING};
pub use engine::{TemplateEngine, TeraEngine};
pub use walker::{
    render_template_directory, render_template_directory_with, RenderOptions, RenderResult,
    DEFAULT_PARTIAL_DIRECTORIES, TEMPLATE_EXTENSION,
};
