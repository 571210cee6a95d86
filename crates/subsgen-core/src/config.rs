//! Configuration module
//!
//! Settings for the pending-selection store, the session tracker, and the
//! processing client. Values come from the environment (a `.env` file is
//! loaded by the binary) with defaults for everything.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_EXPIRY_WINDOW, DEFAULT_MAX_VIDEO_SIZE_MB};
use crate::error::AppError;
pub use crate::storage_types::StorageBackend;

const DEFAULT_API_URL: &str = "http://localhost:7860";
const REQUEST_TIMEOUT_SECS: u64 = 600;
const PROGRESS_TICK_MS: u64 = 2000;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub storage_backend: StorageBackend,
    /// Durable directory holding the pending-selection record.
    pub data_dir: PathBuf,
    /// Session-scoped directory holding the session marker.
    pub session_dir: PathBuf,
    pub session_id: String,
    pub expiry_window: Duration,
    pub max_video_size_bytes: u64,
    pub request_timeout: Duration,
    pub progress_tick: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage_backend = match var("SUBSGEN_STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Local,
        };

        let data_dir = var("SUBSGEN_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| var("XDG_DATA_HOME").map(|p| PathBuf::from(p).join("subsgen")))
            .or_else(|| var("HOME").map(|p| PathBuf::from(p).join(".local/share/subsgen")))
            .unwrap_or_else(|| env::temp_dir().join("subsgen"));

        let session_dir = var("SUBSGEN_SESSION_DIR")
            .map(PathBuf::from)
            .or_else(|| var("XDG_RUNTIME_DIR").map(|p| PathBuf::from(p).join("subsgen")))
            .unwrap_or_else(|| env::temp_dir().join("subsgen-sessions"));

        let expiry_minutes = var("PENDING_EXPIRY_MINUTES").and_then(|s| s.parse::<u64>().ok());
        let expiry_window = match expiry_minutes {
            Some(minutes) => minutes
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(|| AppError::Config("PENDING_EXPIRY_MINUTES is too large".into()))?,
            None => DEFAULT_EXPIRY_WINDOW,
        };

        let max_video_size_bytes = var("MAX_VIDEO_SIZE_MB")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_VIDEO_SIZE_MB)
            .checked_mul(1024 * 1024)
            .ok_or_else(|| AppError::Config("MAX_VIDEO_SIZE_MB is too large".into()))?;

        let config = Config {
            api_url: var("SUBSGEN_API_URL")
                .or_else(|| var("API_URL"))
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            storage_backend,
            data_dir,
            session_dir,
            session_id: var("SUBSGEN_SESSION_ID").unwrap_or_else(default_session_id),
            expiry_window,
            max_video_size_bytes,
            request_timeout: Duration::from_secs(
                var("REQUEST_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(REQUEST_TIMEOUT_SECS),
            ),
            progress_tick: Duration::from_millis(
                var("PROGRESS_TICK_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(PROGRESS_TICK_MS),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(config_error("SUBSGEN_API_URL must start with http:// or https://"));
        }

        if self.expiry_window.is_zero() {
            return Err(config_error("PENDING_EXPIRY_MINUTES must be greater than zero"));
        }

        // Record timestamps are i64 milliseconds.
        if i64::try_from(self.expiry_window.as_millis()).is_err() {
            return Err(config_error("PENDING_EXPIRY_MINUTES is too large"));
        }

        if self.max_video_size_bytes == 0 {
            return Err(config_error("MAX_VIDEO_SIZE_MB must be greater than zero"));
        }

        if self.progress_tick.is_zero() {
            return Err(config_error("PROGRESS_TICK_MS must be greater than zero"));
        }

        Ok(())
    }
}

fn config_error(message: &str) -> anyhow::Error {
    AppError::Config(message.to_string()).into()
}

/// The terminal session is identified by the process that launched us.
fn default_session_id() -> String {
    #[cfg(unix)]
    {
        std::os::unix::process::parent_id().to_string()
    }
    #[cfg(not(unix))]
    {
        "default".to_string()
    }
}
