use std::path::PathBuf;

use color_eyre::{Result, eyre::Context};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    database: Option<String>,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("concert-manager").join("config.toml"))
    }

    /// Load the config file if one exists, otherwise fall back to defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if path.starts_with("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(&path[2..]);
            }
        }
        PathBuf::from(path)
    }

    /// Database file location: config value, else the platform data dir
    pub fn database_path(&self) -> PathBuf {
        if let Some(ref database) = self.database {
            return self.expand_path(database);
        }
        dirs::data_dir()
            .map(|path| path.join("concert-manager").join("concerts.db"))
            .unwrap_or_else(|| PathBuf::from("concerts.db"))
    }
}
