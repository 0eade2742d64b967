//! Configuration management for Loopcast
//!
//! Everything comes from the process environment. A `.env` file is loaded
//! first when present, without overriding variables that are already set.

use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

pub const HANDLE_VAR: &str = "BSKY_HANDLE";
pub const PASSWORD_VAR: &str = "BSKY_PASSWORD";
pub const VIDEO_DIR_VAR: &str = "VIDEO_DIR";
pub const SERVICE_VAR: &str = "BSKY_SERVICE";

/// Default PDS entryway
pub const DEFAULT_SERVICE_URL: &str = "https://bsky.social";

/// Tracking file name, resolved against the working directory
pub const STATE_FILE_NAME: &str = "posted_videos.json";

#[derive(Debug)]
pub struct Config {
    /// Account identifier (handle or DID)
    pub handle: String,
    /// App password
    pub password: SecretString,
    /// Directory scanned for numbered video files
    pub video_dir: PathBuf,
    /// Base URL of the XRPC service
    pub service_url: String,
    /// Path of the tracking file
    pub state_file: PathBuf,
}

impl Config {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.to_string()).into())
        };

        let handle = required(HANDLE_VAR)?;
        let password = required(PASSWORD_VAR)?;
        let video_dir = required(VIDEO_DIR_VAR)?;

        let service_url = lookup(SERVICE_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());

        Ok(Self {
            handle,
            password: SecretString::from(password),
            video_dir: PathBuf::from(video_dir),
            service_url: service_url.trim_end_matches('/').to_string(),
            state_file: PathBuf::from(STATE_FILE_NAME),
        })
    }

    /// Expose the app password for the login request
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}
