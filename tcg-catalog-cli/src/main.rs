//! tcg-catalog CLI
//!
//! Command-line interface for building the local trading-card catalog.

mod cli_types;
mod commands;
mod error;
mod progress;
mod settings;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;
use settings::Settings;

/// Log an empty line at info level, used to space out command output.
pub(crate) fn log_blank() {
    log::info!("");
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_filter = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if verbose {
        builder.format_timestamp_millis();
    } else {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }
    builder.init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Build(args) => match Settings::load(config) {
            Ok((settings, _)) => commands::build::run_build(&settings, args, cli.quiet).await,
            Err(e) => Err(e),
        },
        Commands::Stats { db } => {
            Settings::load(config).and_then(|(settings, _)| commands::stats::run_stats(&settings, db))
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(config),
            ConfigAction::Path => commands::config::run_config_path(config),
        },
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
