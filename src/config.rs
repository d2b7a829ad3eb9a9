use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::provider::ProviderId;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default time-to-live for JSON and XML API providers (10 minutes)
pub const DEFAULT_API_TTL_MS: i64 = 10 * 60 * 1000;

/// Default time-to-live for scraped pages and GitHub releases (1 hour)
pub const DEFAULT_SCRAPE_TTL_MS: i64 = 60 * 60 * 1000;

/// Time-to-live for providers whose data is compiled in
pub const STATIC_TTL_MS: i64 = i64::MAX;

/// Timeout for a single upstream request in milliseconds (10 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 10_000;

/// Delay between starting each provider refresh during warm-up (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

// =============================================================================
// HTTP
// =============================================================================

/// User-Agent sent to JSON and XML APIs
pub const DEFAULT_USER_AGENT: &str = concat!("mcrelease/", env!("CARGO_PKG_VERSION"));

/// User-Agent sent to scraped HTML pages, which reject non-browser agents
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.82 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Resolver configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    pub cache: CacheConfig,
    pub http: HttpConfig,
    /// Per-provider overrides keyed by provider id ("papermc", "forge", ...)
    pub providers: HashMap<String, ProviderConfig>,
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Time-to-live applied to every provider without its own override
    pub ttl_ms: Option<i64>,
}

/// Upstream request configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: FETCH_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Individual provider configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    pub enabled: bool,
    pub ttl_ms: Option<i64>,
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: None,
            base_url: None,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the explicit path if given, otherwise the default config file if
    /// it exists, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = config_path();
                if default_path.is_file() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn provider(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    pub fn is_enabled(&self, id: ProviderId) -> bool {
        self.provider(id).is_none_or(|p| p.enabled)
    }

    /// Effective time-to-live for a provider: provider override, then global
    /// override, then the provider's default.
    pub fn ttl_ms(&self, id: ProviderId) -> i64 {
        self.provider(id)
            .and_then(|p| p.ttl_ms)
            .or(self.cache.ttl_ms)
            .unwrap_or(id.descriptor().default_ttl_ms)
    }

    /// Effective upstream base URL for a provider, without trailing slash
    pub fn base_url(&self, id: ProviderId) -> String {
        self.provider(id)
            .and_then(|p| p.base_url.as_deref())
            .unwrap_or(id.descriptor().base_url)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Returns the path to the config directory for mcrelease.
/// Uses $XDG_CONFIG_HOME/mcrelease if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/mcrelease,
/// or ./mcrelease if neither is available.
pub fn config_dir() -> PathBuf {
    dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
}

/// Returns the path to the data directory (log files) for mcrelease.
pub fn data_dir() -> PathBuf {
    dir_with_env(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn dir_with_env(xdg_home: Option<String>, home_dir: Option<PathBuf>, home_suffix: &str) -> PathBuf {
    let base = xdg_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(home_suffix)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join("mcrelease")
}
