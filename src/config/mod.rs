mod basic;
mod drive;
mod leads;

pub use basic::BasicConfig;
pub use drive::{DriveConfig, DriveFolders};
pub use leads::{LeadsConfig, NumberingConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Drive credentials and folder layout (see `drive` table in config.toml).
    #[serde(default)]
    pub drive: DriveConfig,

    /// Client numbering (see `numbering` table in config.toml).
    #[serde(default)]
    pub numbering: NumberingConfig,

    /// Lead workflow settings (see `leads` table in config.toml).
    #[serde(default)]
    pub leads: LeadsConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "LEADDRIVE_";

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("{0} must be set and non-empty")]
    Missing(&'static str),
}

impl Config {
    /// Builds a Figment that merges defaults, `config.toml` if present, and `LEADDRIVE_*`
    /// environment variables (`__` separates nested keys).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration and validates required fields.
    pub fn load() -> Result<Self, ConfigError> {
        let cfg: Self = Self::figment().extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("drive.client_id", &self.drive.client_id),
            ("drive.client_secret", &self.drive.client_secret),
            ("drive.refresh_token", &self.drive.refresh_token),
            ("drive.folders.leads", &self.drive.folders.leads),
            ("drive.folders.projects", &self.drive.folders.projects),
        ];
        match required.iter().find(|(_, v)| v.trim().is_empty()) {
            Some((key, _)) => Err(ConfigError::Missing(*key)),
            None => Ok(()),
        }
    }
}
