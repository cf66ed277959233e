//! Runtime settings loaded from an optional TOML file.
//!
//! Every key is optional:
//! ```toml
//! item_url_template = "http://www.wowdb.com/api/item/{id}"
//! cache_path = "ptfood-cache.sqlite"
//! cache_ttl_secs = 14400
//! timeout_secs = 30
//! user_agent = "ptfood/0.1"
//! ```

use crate::error::{PtFoodError, Result};
use chrono::TimeDelta;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the item ID in `item_url_template`.
pub const ID_PLACEHOLDER: &str = "{id}";

pub const DEFAULT_ITEM_URL_TEMPLATE: &str = "http://www.wowdb.com/api/item/{id}";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 4 * 60 * 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Longest accepted cache lifetime: one year.
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Where fetched responses are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Sqlite(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub item_url_template: String,
    pub cache_path: PathBuf,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            item_url_template: DEFAULT_ITEM_URL_TEMPLATE.to_string(),
            cache_path: PathBuf::from("ptfood-cache.sqlite"),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("ptfood/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PtFoodError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read settings from {:?}: {}", path, e),
            ))
        })?;

        Self::from_str(&content)
    }

    /// Parse settings from a TOML string and validate them.
    pub fn from_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).map_err(|e| {
            PtFoodError::Config(format!("Failed to parse settings TOML: {}", e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.item_url_template.contains(ID_PLACEHOLDER) {
            return Err(PtFoodError::Config(format!(
                "item_url_template {:?} has no {} placeholder",
                self.item_url_template, ID_PLACEHOLDER
            )));
        }
        if self.cache_ttl_secs == 0 {
            return Err(PtFoodError::Config("cache_ttl_secs must be positive".to_string()));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(PtFoodError::Config(format!(
                "cache_ttl_secs {} exceeds the maximum of {}",
                self.cache_ttl_secs, MAX_CACHE_TTL_SECS
            )));
        }
        if self.timeout_secs == 0 {
            return Err(PtFoodError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Result<TimeDelta> {
        i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| {
                PtFoodError::Config(format!("cache_ttl_secs {} is out of range", self.cache_ttl_secs))
            })
    }

    /// Replace the cache file when one is given on the command line.
    pub fn with_cache_path(mut self, cache_path: Option<PathBuf>) -> Self {
        if let Some(path) = cache_path {
            self.cache_path = path;
        }
        self
    }

    pub fn cache_backend(&self, no_cache: bool) -> CacheBackend {
        if no_cache {
            CacheBackend::Memory
        } else {
            CacheBackend::Sqlite(self.cache_path.clone())
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}
