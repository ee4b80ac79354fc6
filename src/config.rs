// src/config.rs

use crate::cli::Cli;
use crate::error::{KeepError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_LOG_RETENTION_HOURS: u32 = 24;

/// Keys accepted in the JSON config file; anything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub port: Option<u16>,
    pub password: Option<String>,
    pub log_retention_hours: Option<u32>,
    pub host: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(KeepError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let raw = fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        if !value.is_object() {
            return Err(KeepError::Config(
                "config file must contain a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// `~/.config/minikeep/config.json` or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("minikeep").join("config.json"))
    }
}

/// Fully resolved runtime settings, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub password: String,
    pub log_retention_hours: u32,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Settings {
    /// Read the config file named on the command line, or the default one
    /// if it exists, then layer the flags over it.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => ConfigFile::load(path)?,
            None => match ConfigFile::default_path().filter(|p| p.is_file()) {
                Some(path) => {
                    info!("using config file {}", path.display());
                    ConfigFile::load(&path)?
                }
                None => ConfigFile::default(),
            },
        };
        Ok(Self::resolve(cli, file))
    }

    /// Flag beats file beats built-in default.
    pub fn resolve(cli: &Cli, file: ConfigFile) -> Self {
        let log_retention_hours = cli
            .log_retention_hours
            .or(file.log_retention_hours)
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_LOG_RETENTION_HOURS);

        Self {
            host: cli
                .host
                .clone()
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            password: cli.password.clone().or(file.password).unwrap_or_default(),
            log_retention_hours,
            data_dir: cli
                .data_dir
                .clone()
                .or(file.data_dir)
                .unwrap_or_else(|| PathBuf::from("data")),
            log_dir: cli
                .log_dir
                .clone()
                .or(file.log_dir)
                .unwrap_or_else(|| PathBuf::from("log")),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
