//! Configuration file for the quiz app.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_NAME: &str = "rustlens";
/// Used when no platform data directory can be determined.
const FALLBACK_DB_PATH: &str = "db.sqlite3";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub questions: QuestionsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Overrides the default database location
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionsConfig {
    /// External question bank used instead of the bundled one
    #[serde(default)]
    pub bank_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Database file to open, creating its directory if needed
    pub fn db_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        match directories::ProjectDirs::from("", "", APP_NAME) {
            Some(dirs) => {
                std::fs::create_dir_all(dirs.data_dir())?;
                Ok(dirs.data_dir().join("rustlens.sqlite3"))
            }
            None => Ok(PathBuf::from(FALLBACK_DB_PATH)),
        }
    }
}
