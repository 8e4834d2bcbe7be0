//! # Stage Error Types

use stage_rendering::RenderError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or validating the stage configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML or has mistyped values.
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Dotted key of the value.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors starting or stopping a stage.
#[derive(Error, Debug)]
pub enum StageError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Render thread failure.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for stage lifecycle operations.
pub type StageResult<T> = Result<T, StageError>;
