//! Endpoint configuration.
//!
//! Everything the original page hard-codes (URL, action name, headers,
//! timeout) lives in an explicit [`EndpointConfig`] passed into the
//! provider. The defaults reproduce the production constants; a TOML file
//! can override any subset of them.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How the mode/series/range triple is encoded into the form body.
///
/// The upstream action has appeared with two request conventions; which
/// one a deployment expects is a configuration choice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum LocatorStyle {
    /// A single `path` field: `ajax/chart_interval_<mode>/<series>/<days>`.
    #[default]
    Path,
    /// Separate `type`/`series` fields plus a named range field
    /// (`range`, `period`, or `days`, depending on the deployment).
    Split {
        /// Name of the form field carrying the day count.
        range_field: String,
    },
}

/// Bounded retry settings for the transport layer.
///
/// Retries apply to transport-level failures only; non-200 responses and
/// malformed bodies are returned to the caller as-is.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Backoff grows linearly: `base_delay_ms * attempt`.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1500,
        }
    }
}

impl RetryConfig {
    /// Delay before the attempt following `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(u64::from(attempt)))
    }
}

/// Fixed description of the admin-ajax chart endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// The admin-ajax URL receiving the POST.
    pub ajax_url: String,
    /// Origin header; the endpoint rejects cross-origin-looking requests.
    pub origin: String,
    /// Referer header, pointing at the page that hosts the chart.
    pub referer: String,
    /// The `action` form field.
    pub action: String,
    /// Browser-like user agent string.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Locator encoding.
    pub locator: LocatorStyle,
    /// Transport retry settings.
    pub retry: RetryConfig,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            ajax_url: "https://ubslifestyle.com/wp-admin/admin-ajax.php".to_string(),
            origin: "https://ubslifestyle.com".to_string(),
            referer: "https://ubslifestyle.com/harga-buyback-hari-ini/".to_string(),
            action: "get_harga_emas_hari_ini".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            timeout_secs: 30,
            locator: LocatorStyle::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl EndpointConfig {
    /// Loads a config from a TOML file, falling back to the defaults for
    /// any field the file leaves out.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
