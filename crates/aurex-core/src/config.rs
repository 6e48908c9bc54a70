//! Monitor configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::StaleFallback;
use crate::error::ConfigError;
use crate::ProviderId;

/// Tunables for the monitor, its resolver and the refresh scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Freshness window of a cached category (seconds).
    pub cache_ttl_secs: u64,
    /// Periodic refresh interval (seconds).
    pub refresh_interval_secs: u64,
    /// Pause between instruments inside one refresh cycle (milliseconds).
    pub item_pause_ms: u64,
    /// Per-request HTTP timeout (milliseconds).
    pub request_timeout_ms: u64,
    pub stale_fallback: StaleFallback,
    pub providers: ProvidersConfig,
}

#[derive(Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Providers removed from their category chain.
    pub disabled: Vec<ProviderId>,
    /// goldapi.io access token; the provider is skipped without one.
    pub goldapi_key: Option<String>,
}

impl std::fmt::Debug for ProvidersConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvidersConfig")
            .field("disabled", &self.disabled)
            .field(
                "goldapi_key",
                &self.goldapi_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_item_pause_ms() -> u64 {
    300
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            item_pause_ms: default_item_pause_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            stale_fallback: StaleFallback::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Parse and validate configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed, names an unknown provider
    /// or field, or fails [`MonitorConfig::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_ttl_secs",
                reason: String::from("must be greater than 0"),
            });
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "refresh_interval_secs",
                reason: String::from("must be greater than 0"),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_ms",
                reason: String::from("must be greater than 0"),
            });
        }
        Ok(())
    }

    /// Applies `AUREX_*` environment overrides and re-validates.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `AUREX_GOLDAPI_KEY` (fallback `GOLDAPI_KEY`) | `providers.goldapi_key` |
    /// | `AUREX_CACHE_TTL_SECS` | `cache_ttl_secs` |
    /// | `AUREX_REFRESH_INTERVAL_SECS` | `refresh_interval_secs` |
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Same as [`MonitorConfig::with_env_overrides`] with an injectable lookup.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("AUREX_GOLDAPI_KEY").or_else(|| lookup("GOLDAPI_KEY")) {
            if !key.trim().is_empty() {
                self.providers.goldapi_key = Some(key.trim().to_owned());
            }
        }
        if let Some(value) = lookup("AUREX_CACHE_TTL_SECS") {
            self.cache_ttl_secs = parse_secs("cache_ttl_secs", &value)?;
        }
        if let Some(value) = lookup("AUREX_REFRESH_INTERVAL_SECS") {
            self.refresh_interval_secs = parse_secs("refresh_interval_secs", &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn item_pause(&self) -> Duration {
        Duration::from_millis(self.item_pause_ms)
    }
}

fn parse_secs(field: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
        field,
        reason: format!("'{value}' is not a whole number of seconds"),
    })
}
