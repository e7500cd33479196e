mod cli;
mod commands;
mod logging;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use console::style;

use botstrap_core::config::load_user_config;
use botstrap_core::error::BotstrapError;
use cli::{Cli, Commands};
use settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_user_config() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => return report(e.into()),
    };
    logging::init_logging(cli.global.verbose, config.log_level.as_deref());

    let settings = Settings::resolve(&cli.global, &config);
    tracing::debug!(?settings, "resolved settings");

    let result = match cli.command {
        Commands::List { json } => commands::list::run(&settings, json).await,
        Commands::Doctor => commands::doctor::run().await,
        Commands::New(args) => commands::new::run(&settings, args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => report(e),
    }
}

fn report(error: BotstrapError) -> ExitCode {
    if error.is_cancelled() {
        eprintln!("{}", style("Cancelled.").yellow());
        return ExitCode::from(130);
    }
    eprintln!("{:?}", miette::Report::new(error));
    ExitCode::FAILURE
}
