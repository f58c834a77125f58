//! Settings management
//!
//! Operation parameters (credential, project, target) arrive through the
//! plugin environment. This module covers the optional TOML settings file
//! that tunes the remote endpoint, timeouts and build polling. The file is
//! looked up at ~/.config/crowdin-sync/config.toml unless a path is given.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

/// Current settings schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Default Crowdin API address
pub const DEFAULT_BASE_URL: &str = "https://api.crowdin.com";

/// Client label sent as User-Agent on every request
pub const DEFAULT_USER_AGENT: &str = "crowdin-sync";

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Remote endpoint settings
    #[serde(default)]
    pub api: ApiSettings,

    /// Build polling settings
    #[serde(default)]
    pub build: BuildSettings,

    /// Directory for the temporary translation archive (system default if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

/// Remote endpoint and HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for every authenticated API call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for the signed archive download
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

/// Build polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait before the first poll
    #[serde(default = "default_poll_interval")]
    pub initial_delay_secs: u64,

    /// Wait between later polls
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout() -> u64 {
    5
}

fn default_download_timeout() -> u64 {
    300
}

fn default_max_attempts() -> u32 {
    6
}

fn default_poll_interval() -> u64 {
    5
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            download_timeout_secs: default_download_timeout(),
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_secs: default_poll_interval(),
            interval_secs: default_poll_interval(),
        }
    }
}

impl BuildSettings {
    /// Polling policy described by these settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_secs(self.initial_delay_secs),
            Duration::from_secs(self.interval_secs),
        )
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            api: ApiSettings::default(),
            build: BuildSettings::default(),
            temp_dir: None,
        }
    }
}

/// Settings manager handles locating and loading the settings file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default settings path
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        let config_path = config_dir.join("crowdin-sync").join("config.toml");
        Ok(Self { config_path })
    }

    /// Create a ConfigManager with a custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load settings from disk
    ///
    /// A missing file yields the defaults. A file written for a newer
    /// schema is rejected.
    pub fn load(&self) -> Result<Settings> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }

        let content = std::fs::read_to_string(&self.config_path)
            .map_err(|e| Error::filesystem(&self.config_path, e))?;
        let settings: Settings = toml::from_str(&content)?;

        if settings.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Settings file version {} is newer than supported version {}. Please upgrade crowdin-sync.",
                settings.schema_version, SCHEMA_VERSION
            )));
        }

        if settings.build.max_attempts == 0 {
            return Err(Error::Config(
                "build.max_attempts must be at least 1".into(),
            ));
        }

        Ok(settings)
    }
}
