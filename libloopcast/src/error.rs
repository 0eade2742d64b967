//! Error types for Loopcast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoopcastError>;

#[derive(Error, Debug)]
pub enum LoopcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LoopcastError {
    /// Returns the process exit code for an error that ends the run
    ///
    /// Only configuration and login failures are expected to reach the top
    /// level; publish failures are reported as outcomes instead, so every
    /// error that does escape exits with 1.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// True when the error came from the remote service rejecting credentials
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            LoopcastError::Platform(PlatformError::Authentication(_))
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Tracking file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize tracking file: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid video identifier: '{0}'")]
    InvalidId(String),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}
