use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "formflow.toml";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Contents of `formflow.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ISO code of the country whose calling code prefixes local phone numbers.
    pub default_country: String,
    pub output: OutputFormat,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_country: form_flow::country::DEFAULT_COUNTRY.to_string(),
            output: OutputFormat::Text,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Reads the explicit path when given; otherwise the file in the platform
    /// config directory if there is one; otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }
}

pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "formflow", "formflow").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
