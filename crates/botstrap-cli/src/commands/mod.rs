pub mod doctor;
pub mod list;
pub mod new;

use botstrap_core::catalog::{catalog_for, load_template_catalog, LoadedTemplate, ValidateOptions};
use botstrap_core::error::Result;

use crate::settings::Settings;

async fn load_templates(settings: &Settings) -> Result<Vec<LoadedTemplate>> {
    let source = catalog_for(&settings.templates_root);
    load_template_catalog(
        source.as_ref(),
        &ValidateOptions::new(&settings.templates_root),
    )
    .await
}
