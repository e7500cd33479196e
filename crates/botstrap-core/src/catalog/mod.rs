pub mod manifest;
pub mod path;
pub mod source;
pub mod validate;

use std::path::PathBuf;

pub use manifest::{
    LoadedTemplate, LoadedTemplateFile, NormalizedManifest, Plugin, Runtime,
    TemplateFileDescriptor, TemplateManifest, UnknownTag,
};
pub use path::normalize_relative_path;
pub use source::{
    catalog_for, load_template_catalog, BuiltinCatalog, CatalogSource, FileCatalog, CATALOG_FILE,
};
pub use validate::{validate_catalog, ValidateOptions};

/// The `templates/` tree shipped alongside the workspace.
pub fn bundled_templates_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("templates")
}
