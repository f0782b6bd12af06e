use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    /// Config file exists (or was named explicitly) but could not be read.
    Io { path: PathBuf, message: String },
    /// Config file is not valid TOML for `Settings`.
    Parse { path: PathBuf, message: String },
    /// A setting has an unusable value.
    InvalidValue { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "cannot read config {}: {}", path.display(), message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "invalid config {}: {}", path.display(), message)
            }
            ConfigError::InvalidValue { key, message } => write!(f, "invalid value for {}: {}", key, message),
        }
    }
}

impl std::error::Error for ConfigError {}
