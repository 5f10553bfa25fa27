//! Global agenda configuration.

use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, AgendaResult};

static DEFAULT_DATA_DIR: &str = "~/.agenda";
static DEFAULT_ADMIN_PASSWORD: &str = "admin123";
static DEFAULT_LOG_LEVEL: &str = "warn";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn is_default_data_dir(p: &PathBuf) -> bool {
    *p == default_data_dir()
}

fn default_admin_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Configuration at ~/.config/agenda/config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AgendaConfig {
    /// Where the service, appointment and session documents live
    #[serde(default = "default_data_dir", skip_serializing_if = "is_default_data_dir")]
    pub data_dir: PathBuf,

    /// Password for `login admin`
    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    /// Default tracing filter; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        AgendaConfig {
            data_dir: default_data_dir(),
            admin_password: default_admin_password(),
            log_level: default_log_level(),
        }
    }
}

impl AgendaConfig {
    pub fn config_path() -> AgendaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine config directory".into()))?
            .join("agenda");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, writing a commented default file first if
    /// none exists.
    pub fn load() -> AgendaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> AgendaResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| AgendaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AgendaError::Config(e.to_string()))
    }

    /// The data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Save the current config to ~/.config/agenda/config.toml
    pub fn save(&self) -> AgendaResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AgendaResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| AgendaError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AgendaResult<()> {
        let contents = format!(
            "\
# agenda configuration

# Where services, appointments and sessions are stored:
# data_dir = \"{}\"

# Password for `agenda login admin`:
# admin_password = \"{}\"

# Log level (error, warn, info, debug, trace). RUST_LOG overrides it.
# log_level = \"{}\"
",
            DEFAULT_DATA_DIR, DEFAULT_ADMIN_PASSWORD, DEFAULT_LOG_LEVEL
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agenda").join("config.toml");

        AgendaConfig::create_default_config(&path).unwrap();
        let config = AgendaConfig::load_from(&path).unwrap();

        assert_eq!(config, AgendaConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AgendaConfig {
            data_dir: dir.path().join("data"),
            admin_password: "s3cret".to_string(),
            log_level: "debug".to_string(),
        };
        config.save_to(&path).unwrap();

        let loaded = AgendaConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.data_path(), dir.path().join("data"));
    }

    #[test]
    fn test_default_data_dir_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        AgendaConfig::default().save_to(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("data_dir"));
        assert!(content.contains("admin_password"));
    }
}
