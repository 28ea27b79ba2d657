//! Configuration for recipebox
//!
//! Loaded from a TOML file when one is present, defaults otherwise:
//!
//! ```toml
//! storage_dir = "/var/lib/recipebox"
//! cache_key = "recipes"
//! malformed_cache = "refetch"       # or "fail"
//! outstanding_fetches = "detach"    # or "cancel"
//! user_agent = "recipebox/0.1"
//! sources = [
//!     "https://example.com/recipes/1.json",
//!     "https://example.com/recipes/2.json",
//! ]
//! ```

use crate::error::CoreError;
use crate::repository::RepositoryOptions;
use crate::sources::{SourceList, RECIPE_URLS};
use crate::storage::{validate_key, FileStore};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable pointing at a config file
pub const CONFIG_ENV: &str = "RECIPEBOX_CONFIG";

/// Default cache slot name
pub const DEFAULT_CACHE_KEY: &str = "recipes";

/// What to do when the cache slot holds something that is not a record list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedCachePolicy {
    /// Surface `CoreError::CacheReadFailure` and leave the slot alone
    #[default]
    Fail,
    /// Treat the slot as a miss; a successful aggregation overwrites it
    Refetch,
}

/// What happens to fetches still in flight once one of them has failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutstandingFetches {
    /// Abort them
    #[default]
    Cancel,
    /// Let them finish in the background; their results are dropped
    Detach,
}

/// recipebox configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the cache slot (default: `<data dir>/recipebox`)
    pub storage_dir: Option<PathBuf>,

    /// Cache slot name
    pub cache_key: String,

    /// Locators to aggregate, in request order
    pub sources: Vec<String>,

    pub malformed_cache: MalformedCachePolicy,

    pub outstanding_fetches: OutstandingFetches,

    /// Overrides the HTTP `User-Agent` header
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: None,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            sources: RECIPE_URLS.iter().map(|s| s.to_string()).collect(),
            malformed_cache: MalformedCachePolicy::default(),
            outstanding_fetches: OutstandingFetches::default(),
            user_agent: None,
        }
    }
}

impl Config {
    /// Parse TOML and validate the result
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file (must exist)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!(path = %path.display(), sources = config.sources.len(), "Config loaded");
        Ok(config)
    }

    /// Locate and load configuration.
    ///
    /// Lookup order: `explicit` path, `$RECIPEBOX_CONFIG`, then
    /// `<config dir>/recipebox/config.toml` if it exists. Falls back to
    /// defaults when none is found.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Self::load(Path::new(&path));
        }

        if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
            return Self::load(&path);
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// `<config dir>/recipebox/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("recipebox").join("config.toml"))
    }

    /// Check the cache key and every source locator
    pub fn validate(&self) -> Result<(), CoreError> {
        if validate_key(&self.cache_key).is_err() {
            return Err(CoreError::InvalidConfig {
                message: format!("cache_key '{}' is not a valid slot name", self.cache_key),
            });
        }

        self.source_list().map(|_| ())
    }

    pub fn source_list(&self) -> Result<SourceList, CoreError> {
        SourceList::new(&self.sources)
    }

    /// Storage directory, falling back to the platform data dir
    pub fn resolve_storage_dir(&self) -> Result<PathBuf, CoreError> {
        self.storage_dir
            .clone()
            .or_else(FileStore::default_dir)
            .ok_or_else(|| CoreError::InvalidConfig {
                message: "could not determine a storage directory; set storage_dir".to_string(),
            })
    }

    pub fn repository_options(&self) -> RepositoryOptions {
        RepositoryOptions {
            cache_key: self.cache_key.clone(),
            malformed_cache: self.malformed_cache,
            outstanding_fetches: self.outstanding_fetches,
        }
    }
}
