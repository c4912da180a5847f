use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::settings::{Settings, SettingsSource, default_settings_path};

/// Print the settings file path.
pub(crate) fn run_config_path(explicit: Option<&Path>) -> Result<(), CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => default_settings_path()
            .ok_or_else(|| CliError::config("Could not determine config directory"))?,
    };
    log::info!("{}", path.display());
    Ok(())
}

/// Show the settings file status and the effective settings.
pub(crate) fn run_config_show(explicit: Option<&Path>) -> Result<(), CliError> {
    let (settings, source) = Settings::load(explicit)?;

    log::info!(
        "{}",
        "Catalog Settings".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    match &source {
        SettingsSource::File(path) => {
            log::info!(
                "  Settings file: {} {}",
                path.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        SettingsSource::Missing(path) => {
            log::info!(
                "  Settings file: {} {}",
                path.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        SettingsSource::Unknown => {
            log::info!(
                "  Settings file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    crate::log_blank();

    for line in settings.to_toml_string()?.lines() {
        log::info!("  {}", line);
    }
    Ok(())
}
