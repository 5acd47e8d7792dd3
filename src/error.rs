use thiserror::Error;

/// Errors raised while loading or validating a [`crate::config::SimConfig`].
///
/// Only the configuration boundary can fail; once a simulation exists every
/// runtime input is clamped instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}
