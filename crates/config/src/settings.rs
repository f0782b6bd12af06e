use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_ANALYSIS_URL: &str = "http://localhost:5678/webhook/field-analysis";
pub const DEFAULT_AUXILIARY_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const ENV_ANALYSIS_URL: &str = "FIELDRISK_ANALYSIS_URL";
pub const ENV_AUXILIARY_URL: &str = "FIELDRISK_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "FIELDRISK_TIMEOUT_SECS";

/// Deployment settings.
///
/// Both URLs are opaque to the rest of the workspace. `auxiliary_url` is
/// carried for deployments that expect it but nothing reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub analysis_url: String,
    pub auxiliary_url: String,
    /// Request timeout in seconds. `0` disables the timeout.
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            analysis_url: DEFAULT_ANALYSIS_URL.to_string(),
            auxiliary_url: DEFAULT_AUXILIARY_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Default config file path: `<config_dir>/fieldrisk/config.toml`.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fieldrisk");
        config_dir.join("config.toml")
    }

    /// Resolve settings: defaults, then the config file, then the process
    /// environment.
    ///
    /// With `explicit` set, that file must exist. Without it, a missing
    /// default file just means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    log::debug!("no config file at {}, using defaults", path.display());
                    Self::default()
                }
            }
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse { path: path.to_path_buf(), message },
            other => other,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment overrides through `lookup`. Unset or empty variables
    /// leave the current value alone.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_ANALYSIS_URL) {
            self.analysis_url = url;
        }
        if let Some(url) = get(ENV_AUXILIARY_URL) {
            self.auxiliary_url = url;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT_SECS.to_string(),
                message: format!("expected whole seconds, got '{}'", raw),
            })?;
        }
        self.validate()
    }

    /// Timeout to apply to the analysis request, if any.
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "settings".to_string(),
            message: e.to_string(),
        })
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("analysis_url", &self.analysis_url), ("auxiliary_url", &self.auxiliary_url)] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}
