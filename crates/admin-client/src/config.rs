//! Client configuration
//!
//! Read from environment variables; CLI flags override individual values.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_DATA_DIR: &str = ".coop-admin";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend origin, without the `/api/v1` prefix
    pub api_url: String,
    /// Directory holding the persisted session
    pub data_dir: PathBuf,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

impl ClientConfig {
    /// Build from `COOP_API_URL`, `COOP_DATA_DIR` and `COOP_HTTP_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let timeout = match env_value("COOP_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "Ignoring invalid COOP_HTTP_TIMEOUT_SECS '{}', using {}s",
                        raw,
                        DEFAULT_TIMEOUT_SECS
                    );
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Self {
            api_url: env_value("COOP_API_URL").unwrap_or(defaults.api_url),
            data_dir: env_value("COOP_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            timeout,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the versioned REST API
    pub fn api_base(&self) -> String {
        format!("{}/api/v1", self.api_url.trim_end_matches('/'))
    }

    /// File holding the persisted key-value entries
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }
}
