use std::process::ExitCode;

use botstrap_core::error::Result;
use botstrap_core::listing::{format_template_json, format_template_list};

use crate::settings::Settings;

pub async fn run(settings: &Settings, json: bool) -> Result<ExitCode> {
    let templates = super::load_templates(settings).await?;

    if json {
        println!("{}", format_template_json(&templates)?);
    } else {
        println!("{}", format_template_list(&templates));
    }

    Ok(ExitCode::SUCCESS)
}
