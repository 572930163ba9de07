use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use toml_edit::{DocumentMut, Item, Table};

use crate::capture::Quality;
use crate::scheduler::{SessionSettings, DEFAULT_INTERVAL_SECS};
use crate::session::SessionMetadata;
use crate::util::paths::config_path;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

const DEFAULT_USER_NAME: &str = "Anonymous";
const DEFAULT_COMPANY: &str = "None";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid TOML: {0}")]
    Parse(#[from] toml_edit::TomlError),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Support engineer name written into every report
    pub user_name: String,
    /// Client company written into every report
    pub company: String,
    /// Seconds between captures
    pub interval_secs: u64,
    pub quality: Quality,
    /// Roll the batch into an archive every this many seconds
    pub archive_interval_secs: Option<u64>,
    /// Where master bundles are written
    pub master_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_name: DEFAULT_USER_NAME.to_string(),
            company: DEFAULT_COMPANY.to_string(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            quality: Quality::default(),
            archive_interval_secs: None,
            master_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlUserConfig {
    pub name: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlCaptureConfig {
    pub interval_secs: Option<u64>,
    pub quality: Option<String>,
    pub archive_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlOutputConfig {
    pub master_dir: Option<PathBuf>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub user: Option<TomlUserConfig>,
    pub capture: Option<TomlCaptureConfig>,
    pub output: Option<TomlOutputConfig>,
}

impl Config {
    /// Load configuration from the default location, merging with defaults
    pub fn load() -> Self {
        let config_file = config_path();

        // Create example config on first run
        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        Self::load_from(&config_file)
    }

    /// Load `path` over the defaults. A missing or malformed file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Config::default();

        let Ok(contents) = fs::read_to_string(path) else {
            return config;
        };
        match toml::from_str::<TomlConfig>(&contents) {
            Ok(toml_config) => config.merge(toml_config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed config");
            }
        }
        config
    }

    fn merge(&mut self, toml_config: TomlConfig) {
        if let Some(user) = toml_config.user {
            if let Some(name) = user.name.filter(|n| !n.trim().is_empty()) {
                self.user_name = name;
            }
            if let Some(company) = user.company.filter(|c| !c.trim().is_empty()) {
                self.company = company;
            }
        }

        if let Some(capture) = toml_config.capture {
            if let Some(secs) = capture.interval_secs.filter(|s| *s > 0) {
                self.interval_secs = secs;
            }
            if let Some(quality) = capture.quality {
                match Quality::parse(&quality) {
                    Some(q) => self.quality = q,
                    None => tracing::warn!(quality = %quality, "Unknown quality in config"),
                }
            }
            self.archive_interval_secs = capture.archive_interval_secs.filter(|s| *s > 0);
        }

        if let Some(output) = toml_config.output {
            self.master_dir = output.master_dir;
        }
    }

    /// Create the default config file from the bundled example
    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "Failed to create config directory");
                return;
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }

    /// Report header fields for a session with the given description
    pub fn metadata(&self, description: impl Into<String>) -> SessionMetadata {
        SessionMetadata {
            name: self.user_name.clone(),
            company: self.company.clone(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Scheduler settings derived from this configuration
    pub fn session_settings(&self, metadata: SessionMetadata) -> SessionSettings {
        let mut settings =
            SessionSettings::new(self.interval_secs, self.quality).with_metadata(metadata);
        if let Some(secs) = self.archive_interval_secs {
            settings = settings.with_archive_every(Duration::from_secs(secs));
        }
        if let Some(dir) = &self.master_dir {
            settings = settings.with_destination(dir.clone());
        }
        settings
    }
}

fn read_document(path: &Path) -> Result<DocumentMut, ConfigError> {
    let contents = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };
    Ok(contents.parse()?)
}

fn write_document(path: &Path, doc: &DocumentMut) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_string())?;
    Ok(())
}

fn ensure_table(doc: &mut DocumentMut, key: &str) {
    if !doc.contains_key(key) {
        doc[key] = Item::Table(Table::new());
    }
}

/// Save the support engineer profile to the config file.
///
/// Updates the [user] section and leaves everything else untouched.
pub fn save_user_profile(path: &Path, name: &str, company: &str) -> Result<(), ConfigError> {
    let mut doc = read_document(path)?;
    ensure_table(&mut doc, "user");
    doc["user"]["name"] = toml_edit::value(name);
    doc["user"]["company"] = toml_edit::value(company);
    write_document(path, &doc)
}

/// Save the master bundle destination to the config file
pub fn save_master_dir(path: &Path, dir: &Path) -> Result<(), ConfigError> {
    let mut doc = read_document(path)?;
    ensure_table(&mut doc, "output");
    doc["output"]["master_dir"] = toml_edit::value(dir.to_string_lossy().to_string());
    write_document(path, &doc)
}
