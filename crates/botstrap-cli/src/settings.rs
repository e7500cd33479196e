use std::path::PathBuf;

use botstrap_core::catalog::{bundled_templates_root, Runtime};
use botstrap_core::config::UserConfig;
use botstrap_core::prompt::is_interactive_terminal;

use crate::cli::GlobalArgs;

/// Effective settings after layering command-line flags over the user config.
#[derive(Debug, Clone)]
pub struct Settings {
    pub templates_root: PathBuf,
    pub runtime: Option<Runtime>,
    pub interactive: bool,
}

impl Settings {
    pub fn resolve(args: &GlobalArgs, config: &UserConfig) -> Self {
        Self::resolve_with(args, config, is_interactive_terminal())
    }

    fn resolve_with(args: &GlobalArgs, config: &UserConfig, terminal: bool) -> Self {
        let templates_root = args
            .templates_dir
            .clone()
            .or_else(|| config.templates_dir.clone())
            .unwrap_or_else(bundled_templates_root);

        let interactive = terminal && !args.no_interactive && config.interactive.unwrap_or(true);

        Self {
            templates_root,
            runtime: args.runtime.or(config.default_runtime),
            interactive,
        }
    }
}
