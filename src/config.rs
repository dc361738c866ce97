//! Bot configuration module.
//!
//! Handles loading, validating, and merging `configuration.json`. Stock
//! defaults are the base layer; the user file only needs the keys it wants
//! to change.
//!
//! ## Configuration Options
//!
//! ```json
//! {
//!     "language": "en",
//!     "sendOnStart": false,
//!     "checkForUpdates": 10,
//!     "supportACreator": null,
//!     "commitPolicy": "renderSuccess",
//!     "fortniteAPI": {
//!         "apiKey": "",
//!         "endpoint": "https://fortnite-api.com/v2/shop/br/combined"
//!     },
//!     "twitter": {
//!         "enabled": false,
//!         "apiKey": "",
//!         "apiSecret": "",
//!         "accessToken": "",
//!         "accessSecret": ""
//!     }
//! }
//! ```
//!
//! - `language`: catalog language and date label locale.
//! - `sendOnStart`: render the catalog found on the first poll. When false the
//!   first poll only records the current hash.
//! - `checkForUpdates`: seconds between polls (at least 1).
//! - `supportACreator`: creator code appended to the caption, if any.
//! - `commitPolicy`: when a new hash counts as handled, see [`CommitPolicy`].
//!
//! ## Partial Configuration
//!
//! ```json
//! { "language": "de", "twitter": { "enabled": true, "apiKey": "…", … } }
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://fortnite-api.com/v2/shop/br/combined";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// When a newly seen catalog hash is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommitPolicy {
    /// Commit once the image is written. Publish failures are only logged.
    #[default]
    RenderSuccess,
    /// Commit only after a successful publish, so a failed post is retried
    /// with a fresh render on the next poll. Without publishing this behaves
    /// like `RenderSuccess`.
    PublishSuccess,
}

/// Bot configuration loaded from `configuration.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct BotConfig {
    pub language: String,
    pub send_on_start: bool,
    /// Poll interval in seconds.
    pub check_for_updates: u64,
    #[serde(rename = "supportACreator")]
    pub support_a_creator: Option<String>,
    pub commit_policy: CommitPolicy,
    #[serde(rename = "fortniteAPI")]
    pub fortnite_api: FortniteApiConfig,
    pub twitter: TwitterConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            send_on_start: false,
            check_for_updates: 10,
            support_a_creator: None,
            commit_policy: CommitPolicy::default(),
            fortnite_api: FortniteApiConfig::default(),
            twitter: TwitterConfig::default(),
        }
    }
}

impl BotConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.language.trim().is_empty() {
            return Err(ConfigError::Validation("language must not be empty".into()));
        }
        if self.check_for_updates == 0 {
            return Err(ConfigError::Validation(
                "checkForUpdates must be at least 1 second".into(),
            ));
        }
        if self.fortnite_api.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(
                "fortniteAPI.endpoint must not be empty".into(),
            ));
        }
        if self.twitter.enabled {
            let missing: Vec<&str> = self
                .twitter
                .credentials()
                .into_iter()
                .filter(|(_, value)| value.trim().is_empty())
                .map(|(name, _)| name)
                .collect();
            if !missing.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "twitter is enabled but {} {} empty",
                    missing
                        .iter()
                        .map(|n| format!("twitter.{n}"))
                        .collect::<Vec<_>>()
                        .join(", "),
                    if missing.len() == 1 { "is" } else { "are" }
                )));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.check_for_updates)
    }

    /// Creator code, ignoring blank values.
    pub fn creator_code(&self) -> Option<&str> {
        self.support_a_creator
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// Catalog API access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct FortniteApiConfig {
    pub api_key: String,
    pub endpoint: String,
}

impl Default for FortniteApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// Twitter publishing. The four credentials are the OAuth 1.0a consumer
/// key/secret and access token/secret of the posting account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct TwitterConfig {
    pub enabled: bool,
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl TwitterConfig {
    fn credentials(&self) -> [(&'static str, &str); 4] {
        [
            ("apiKey", self.api_key.as_str()),
            ("apiSecret", self.api_secret.as_str()),
            ("accessToken", self.access_token.as_str()),
            ("accessSecret", self.access_secret.as_str()),
        ]
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a JSON object.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<Value, ConfigError> {
    Ok(serde_json::to_value(BotConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Objects are merged key-by-key (overlay keys override base keys).
/// - Non-object values in overlay replace base values entirely, `null` included.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_json(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => merge_json(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as raw JSON.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid JSON.
pub fn load_raw_config(path: &Path) -> Result<Option<Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(base: Value, overlay: Option<Value>) -> Result<BotConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_json(base, ov),
        None => base,
    };
    let config: BotConfig = serde_json::from_value(merged)?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<BotConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    if overlay.is_none() {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
    }
    resolve_config(base, overlay)
}

/// The stock config as pretty-printed JSON.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_json() -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(&BotConfig::default())?)
}
