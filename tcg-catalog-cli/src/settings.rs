//! User settings loaded from a TOML file.
//!
//! Every key is optional. Command-line flags take priority over the file,
//! and the file over the built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tcg_catalog::SeriesFolderConvention;
use tcg_catalog_sources::{DEFAULT_BASE_URL, FetchOptions};

use crate::CliError;

/// Default settings file location: `<config_dir>/tcg-catalog/settings.toml`.
pub(crate) fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tcg-catalog").join("settings.toml"))
}

pub(crate) fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("tcg-catalog"))
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("catalog.db")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub data_dir: PathBuf,
    pub archive_path: Option<PathBuf>,
    pub database_path: PathBuf,
    pub file_extension: String,
    pub series_folder: SeriesFolderConvention,
    pub remote: RemoteSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            archive_path: None,
            database_path: default_database_path(),
            file_extension: "ts".to_string(),
            series_folder: SeriesFolderConvention::default(),
            remote: RemoteSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct RemoteSettings {
    pub enabled: bool,
    pub base_url: String,
    pub languages: Vec<String>,
    pub list_language: String,
    pub concurrency: usize,
    pub limit: Option<usize>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        let fetch = FetchOptions::default();
        Self {
            enabled: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            languages: fetch.languages,
            list_language: fetch.list_language,
            concurrency: fetch.concurrency,
            limit: fetch.limit,
        }
    }
}

impl RemoteSettings {
    pub(crate) fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            languages: self.languages.clone(),
            list_language: self.list_language.clone(),
            concurrency: self.concurrency,
            limit: self.limit,
        }
    }
}

/// Where the effective settings came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SettingsSource {
    File(PathBuf),
    /// No file at this path; defaults are in effect.
    Missing(PathBuf),
    /// No config directory could be determined.
    Unknown,
}

impl Settings {
    pub(crate) fn from_toml_str(text: &str) -> Result<Self, CliError> {
        toml::from_str(text).map_err(|e| CliError::config(format!("Invalid settings: {}", e)))
    }

    pub(crate) fn to_toml_string(&self) -> Result<String, CliError> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("Failed to serialize settings: {}", e)))
    }

    /// Load settings from `explicit`, or from the default location.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// explicit file is an error.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<(Self, SettingsSource), CliError> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::config(format!(
                        "Settings file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match default_settings_path() {
                Some(path) => path,
                None => return Ok((Self::default(), SettingsSource::Unknown)),
            },
        };

        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok((Self::default(), SettingsSource::Missing(path)));
        }

        let text = std::fs::read_to_string(&path)?;
        let settings = Self::from_toml_str(&text).map_err(|e| {
            CliError::config(format!("{} ({})", e, path.display()))
        })?;
        log::debug!("Loaded settings from {}", path.display());
        Ok((settings, SettingsSource::File(path)))
    }
}
