use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use botstrap_core::catalog::{Plugin, Runtime};

#[derive(Parser)]
#[command(
    name = "botstrap",
    about = "Scaffold grammY bot starters across runtimes",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Target runtime (deno, node, or bun)
    #[arg(short, long, global = true, value_parser = parse_runtime)]
    pub runtime: Option<Runtime>,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    /// Templates root containing a catalog.toml
    #[arg(long, global = true, env = "BOTSTRAP_TEMPLATES_DIR", value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available templates
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Validate environment and dependencies
    Doctor,

    /// Generate a new bot project from a template
    New(NewArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct NewArgs {
    /// Project name
    pub name: Option<String>,

    /// Template name (see `botstrap list`)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Output directory (default: ./<name>)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Plugin to enable (can be repeated)
    #[arg(short, long = "plugin", value_parser = parse_plugin)]
    pub plugins: Vec<Plugin>,
}

fn parse_runtime(value: &str) -> Result<Runtime, String> {
    value
        .trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|e: botstrap_core::catalog::UnknownTag| e.to_string())
}

fn parse_plugin(value: &str) -> Result<Plugin, String> {
    value
        .trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|e: botstrap_core::catalog::UnknownTag| e.to_string())
}
