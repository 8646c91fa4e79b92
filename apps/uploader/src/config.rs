//! Uploader configuration.
//!
//! Stored as TOML at `~/.config/lago/uploader.toml`. Every field is
//! optional; a missing file means defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use lago_upload::CoordinatorOptions;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `base_url`.
pub const BASE_URL_ENV: &str = "LAGO_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploaderConfig {
    /// Root of the upload API.
    pub base_url: String,

    /// Files up to this many bytes are sent in one request.
    pub multipart_threshold: u64,

    /// Bytes per part for chunked uploads.
    pub part_size: u64,

    /// Timeout for each HTTP request.
    pub request_timeout_secs: u64,

    /// Timeout for the cleanup call after a failed upload.
    pub abort_timeout_secs: u64,

    /// JSON session file holding the access token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_path: Option<PathBuf>,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        let options = CoordinatorOptions::default();
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            multipart_threshold: options.multipart_threshold,
            part_size: options.part_size,
            request_timeout_secs: 30,
            abort_timeout_secs: options.abort_timeout.as_secs(),
            session_path: None,
        }
    }
}

impl UploaderConfig {
    /// Loads `path`, or the default location when `path` is `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Applies `LAGO_BASE_URL` when it is set and non-empty.
    pub fn apply_env(&mut self) {
        self.apply_base_url_override(std::env::var(BASE_URL_ENV).ok());
    }

    fn apply_base_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions {
            multipart_threshold: self.multipart_threshold,
            part_size: self.part_size,
            abort_timeout: Duration::from_secs(self.abort_timeout_secs),
        }
    }
}

/// Returns the default config file path.
pub fn config_path() -> Option<PathBuf> {
    lago_session::lago_config_dir().map(|d| d.join("uploader.toml"))
}
