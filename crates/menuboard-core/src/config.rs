//! Application configuration management.
//!
//! Settings come from `~/.config/menuboard/config.json` and can be
//! overridden by environment variables. The store key is normally kept in
//! the OS keychain rather than in the file.
//!
//! Without a usable store URL and key the service runs read-only on the
//! bundled menu.

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::DEFAULT_CACHE_TTL_MINUTES;
use crate::credentials::CredentialStore;

/// Application name used for config directory paths
const APP_NAME: &str = "menuboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Values shipped in setup templates; treated as "not configured".
const PLACEHOLDER_URL: &str = "YOUR_SUPABASE_URL_HERE";
const PLACEHOLDER_KEY: &str = "YOUR_SUPABASE_ANON_KEY_HERE";

pub const ENV_STORE_URL: &str = "MENUBOARD_STORE_URL";
pub const ENV_STORE_KEY: &str = "MENUBOARD_STORE_KEY";
pub const ENV_CACHE_TTL_SECS: &str = "MENUBOARD_CACHE_TTL_SECS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "MENUBOARD_REQUEST_TIMEOUT_SECS";

/// Everything needed to open a connection to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    pub url: String,
    pub api_key: String,
    pub request_timeout: Option<StdDuration>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub store_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_key: Option<String>,
    pub cache_ttl_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    /// Replacement for the bundled fallback menu.
    pub fallback_menu: Option<PathBuf>,
}

fn parse_secs(key: &str, value: String) -> Option<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value {value:?}: {e}");
        })
        .ok()
}

fn is_valid_url(url: &str) -> bool {
    url != PLACEHOLDER_URL && url.starts_with("https://")
}

fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty() && key != PLACEHOLDER_KEY
}

impl Config {
    /// Load the config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        Ok(Self::load_file()?.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_STORE_URL) {
            self.store_url = Some(url);
        }
        if let Some(key) = lookup(ENV_STORE_KEY) {
            self.store_key = Some(key);
        }
        if let Some(secs) = lookup(ENV_CACHE_TTL_SECS).and_then(|v| parse_secs(ENV_CACHE_TTL_SECS, v)) {
            self.cache_ttl_secs = Some(secs);
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS)
            .and_then(|v| parse_secs(ENV_REQUEST_TIMEOUT_SECS, v))
        {
            self.request_timeout_secs = Some(secs);
        }
        self
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        match self.cache_ttl_secs {
            Some(secs) => chrono::Duration::seconds(secs.min(i64::MAX as u64) as i64),
            None => chrono::Duration::minutes(DEFAULT_CACHE_TTL_MINUTES),
        }
    }

    /// Store settings, falling back to the keychain for the key.
    pub fn store_settings(&self) -> Option<StoreSettings> {
        self.resolve_store_settings(|url| CredentialStore::get_key(url).ok())
    }

    /// Store settings, using `keychain` when no key is set in the file or
    /// environment. Returns `None` when either value is missing or still a
    /// setup placeholder.
    pub fn resolve_store_settings(
        &self,
        keychain: impl FnOnce(&str) -> Option<String>,
    ) -> Option<StoreSettings> {
        let url = self.store_url.as_deref().map(str::trim)?;
        if !is_valid_url(url) {
            warn!(url = %url, "Store URL is not a usable https:// address");
            return None;
        }

        let api_key = self
            .store_key
            .clone()
            .or_else(|| keychain(url))
            .filter(|key| is_valid_key(key))?;

        Some(StoreSettings {
            url: url.to_string(),
            api_key,
            request_timeout: self.request_timeout_secs.map(StdDuration::from_secs),
        })
    }
}
