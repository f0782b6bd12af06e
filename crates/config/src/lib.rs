// Configuration loading

pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{
    Settings, DEFAULT_ANALYSIS_URL, DEFAULT_AUXILIARY_URL, DEFAULT_TIMEOUT_SECS, ENV_ANALYSIS_URL,
    ENV_AUXILIARY_URL, ENV_TIMEOUT_SECS,
};
