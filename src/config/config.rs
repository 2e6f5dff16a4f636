use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show row numbers in the grid gutter.
    pub show_row_numbers: bool,

    /// Rows rendered beyond the viewport on each side.
    pub overscan: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_row_numbers: true,
            overscan: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Record executed queries in history.
    pub enable_history: bool,

    /// Directory for exported files; defaults to the working directory.
    pub export_dir: Option<PathBuf>,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            enable_history: true,
            export_dir: None,
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sql-runner").join("config.toml"))
    }

    /// Load the user config, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    debug!(target: "config", "Loaded {}", path.display());
                    config
                }
                Err(err) => {
                    debug!(target: "config", "Bad config ({}), using defaults", err);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn export_dir(&self) -> PathBuf {
        self.behavior
            .export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.display.show_row_numbers);
        assert_eq!(config.display.overscan, 10);
        assert!(config.behavior.enable_history);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[display]\noverscan = 3\n").unwrap();
        assert_eq!(config.display.overscan, 3);
        assert!(config.display.show_row_numbers);
        assert!(config.behavior.enable_history);
    }

    #[test]
    fn test_round_trip() {
        let mut config = Config::default();
        config.display.overscan = 7;
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.display.overscan, 7);
    }
}
