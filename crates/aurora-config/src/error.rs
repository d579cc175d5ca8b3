//! Configuration error types.

use aurora_atmosphere::ParameterError;

/// Errors that can occur when loading, saving, or validating the scene
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    Parse(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] ron::Error),

    /// The record parsed but the atmosphere parameters are invalid.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ParameterError),

    /// The sky mode string is not a known mode.
    #[error("unknown sky mode `{0}` (expected \"analytic\" or \"integrated\")")]
    UnknownSkyMode(String),
}
