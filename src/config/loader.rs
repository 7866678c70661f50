//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml structure.
//! Missing sections and fields fall back to the built-in defaults.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on `cache.freshness_secs` (one day)
pub const MAX_FRESHNESS_SECS: u64 = 86_400;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewaySection,
    pub pair_lookup: PairLookupSection,
    pub cache: CacheSection,
    pub http: HttpSection,
    pub history: HistorySection,
    pub refresh: RefreshSection,
    pub logging: LoggingSection,
}

/// Listing gateway (Moralis) section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaySection {
    /// Gateway base URL
    pub base_url: String,
    /// API key (prefer MORALIS_API_KEY in .env over committing it here)
    pub api_key: Option<String>,
    /// Records requested per sub-feed
    pub listing_limit: u32,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            base_url: "https://solana-gateway.moralis.io".to_string(),
            api_key: None,
            listing_limit: 50,
        }
    }
}

impl GatewaySection {
    /// Get API key with environment variable fallback
    /// Checks MORALIS_API_KEY env var if config value is empty/None
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("MORALIS_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

/// Pair lookup (DexScreener) section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PairLookupSection {
    /// Base URL; the contract address is appended as the last path segment
    pub base_url: String,
}

impl Default for PairLookupSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.dexscreener.com/latest/dex/tokens".to_string(),
        }
    }
}

/// Listing cache section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Seconds an aggregated listing is served without re-querying upstream
    pub freshness_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self { freshness_secs: 45 }
    }
}

/// HTTP client section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self { timeout_secs: 9 }
    }
}

/// Price history section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    /// Close prices requested per token
    pub max_points: usize,
    /// Fewer valid closes than this and the series is rejected
    pub min_points: usize,
    /// Length of a synthesized placeholder series
    pub placeholder_points: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            max_points: 120,
            min_points: 6,
            placeholder_points: 80,
        }
    }
}

/// Periodic refresh section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshSection {
    /// Seconds between listing refreshes in watch mode
    pub interval_secs: u64,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self { interval_secs: 120 }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: "warn".to_string() }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration if the file exists, otherwise use the defaults
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    if path.as_ref().exists() {
        load_config(path)
    } else {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "gateway.base_url cannot be empty".to_string(),
            ));
        }

        if self.gateway.listing_limit == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.listing_limit must be > 0".to_string(),
            ));
        }

        if self.pair_lookup.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "pair_lookup.base_url cannot be empty".to_string(),
            ));
        }

        if self.cache.freshness_secs == 0 || self.cache.freshness_secs > MAX_FRESHNESS_SECS {
            return Err(ConfigError::ValidationError(format!(
                "cache.freshness_secs must be 1..={}, got {}",
                MAX_FRESHNESS_SECS, self.cache.freshness_secs
            )));
        }

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "http.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.history.min_points < 2 || self.history.min_points > self.history.max_points {
            return Err(ConfigError::ValidationError(format!(
                "history.min_points must be 2..={}, got {}",
                self.history.max_points, self.history.min_points
            )));
        }

        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "refresh.interval_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn freshness_window(&self) -> chrono::Duration {
        // clamped so an unvalidated config cannot overflow
        chrono::Duration::seconds(self.cache.freshness_secs.min(MAX_FRESHNESS_SECS) as i64)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[gateway]
base_url = "https://gateway.example.com"
listing_limit = 25

[pair_lookup]
base_url = "https://pairs.example.com/tokens"

[cache]
freshness_secs = 30

[http]
timeout_secs = 5

[history]
max_points = 60
min_points = 6
placeholder_points = 40

[refresh]
interval_secs = 90

[logging]
level = "info"
"#
        .to_string()
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(&create_valid_config());
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.gateway.base_url, "https://gateway.example.com");
        assert_eq!(config.gateway.listing_limit, 25);
        assert_eq!(config.pair_lookup.base_url, "https://pairs.example.com/tokens");
        assert_eq!(config.cache.freshness_secs, 30);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.history.max_points, 60);
        assert_eq!(config.refresh_interval(), Duration::from_secs(90));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_defaults_match_upstream_constants() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gateway.base_url, "https://solana-gateway.moralis.io");
        assert_eq!(config.gateway.listing_limit, 50);
        assert_eq!(config.freshness_window(), chrono::Duration::seconds(45));
        assert_eq!(config.request_timeout(), Duration::from_secs(9));
        assert_eq!(config.history.max_points, 120);
        assert_eq!(config.history.min_points, 6);
        assert_eq!(config.history.placeholder_points, 80);
        assert_eq!(config.refresh.interval_secs, 120);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let file = write_config("[cache]\nfreshness_secs = 10\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.cache.freshness_secs, 10);
        assert_eq!(config.http.timeout_secs, 9);
        assert_eq!(config.gateway.listing_limit, 50);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = load_config_or_default("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config.cache.freshness_secs, 45);
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("[cache\nfreshness_secs = ");
        assert!(matches!(load_config(file.path()), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_zero_freshness_rejected() {
        let file = write_config("[cache]\nfreshness_secs = 0\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_oversized_freshness_rejected() {
        let file = write_config("[cache]\nfreshness_secs = 100000000000000000\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));

        let file = write_config("[cache]\nfreshness_secs = 86400\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.freshness_window(), chrono::Duration::days(1));
    }

    #[test]
    fn test_freshness_window_clamped_without_validation() {
        let mut config = Config::default();
        config.cache.freshness_secs = u64::MAX;
        assert_eq!(config.freshness_window(), chrono::Duration::seconds(MAX_FRESHNESS_SECS as i64));
    }

    #[test]
    fn test_history_bounds_rejected() {
        let file = write_config("[history]\nmax_points = 5\nmin_points = 6\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_api_key_from_config() {
        let file = write_config("[gateway]\napi_key = \"from-file\"\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.gateway.get_api_key(), Some("from-file".to_string()));
    }
}
