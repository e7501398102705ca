//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/itinerary-guard/) and project
//! (.itinerary-guard/) level configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{cost, network, parser, weather};
use crate::types::{GuardError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Response parser limits
    pub parser: ParserConfig,

    /// Cost-field recognition
    pub cost: CostConfig,

    /// Weather enrichment settings
    pub weather: WeatherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            parser: ParserConfig::default(),
            cost: CostConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `GuardError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.parser.sandbox_timeout_ms == 0 || self.parser.sandbox_timeout_ms > 10_000 {
            return Err(GuardError::Config(format!(
                "parser.sandbox_timeout_ms must be between 1 and 10000, got {}",
                self.parser.sandbox_timeout_ms
            )));
        }

        if self.parser.max_depth == 0 {
            return Err(GuardError::Config(
                "parser.max_depth must be greater than 0".to_string(),
            ));
        }

        if self.cost.suffixes.iter().any(|s| s.trim().is_empty()) {
            return Err(GuardError::Config(
                "cost.suffixes must not contain empty entries".to_string(),
            ));
        }

        if self.weather.horizon_days == 0 {
            return Err(GuardError::Config(
                "weather.horizon_days must be greater than 0".to_string(),
            ));
        }

        if self.weather.max_concurrency == 0 {
            return Err(GuardError::Config(
                "weather.max_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.weather.request_timeout_secs == 0 {
            return Err(GuardError::Config(
                "weather.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        for (name, base) in [
            ("forecast_base_url", &self.weather.forecast_base_url),
            ("geocoding_base_url", &self.weather.geocoding_base_url),
            ("archive_base_url", &self.weather.archive_base_url),
        ] {
            let url = url::Url::parse(base).map_err(|e| {
                GuardError::Config(format!("weather.{} is not a valid URL '{}': {}", name, base, e))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(GuardError::Config(format!(
                    "weather.{} must use http or https, got: {}",
                    name,
                    url.scheme()
                )));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Parser Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    /// Wall-clock budget for the sandboxed expression tier
    pub sandbox_timeout_ms: u64,

    /// Maximum nesting depth for lenient and sandboxed parsing
    pub max_depth: usize,

    /// Inputs larger than this skip the sandboxed tier
    pub max_sandbox_input_bytes: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            sandbox_timeout_ms: parser::SANDBOX_TIMEOUT_MS,
            max_depth: parser::MAX_NESTING_DEPTH,
            max_sandbox_input_bytes: parser::MAX_SANDBOX_INPUT_BYTES,
        }
    }
}

impl ParserConfig {
    pub fn sandbox_timeout(&self) -> Duration {
        Duration::from_millis(self.sandbox_timeout_ms)
    }
}

// =============================================================================
// Cost Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CostConfig {
    /// Key suffixes marking a field as cost-bearing
    pub suffixes: Vec<String>,

    /// Object keys whose scalar members are all cost-bearing
    pub breakdown_containers: Vec<String>,

    /// Keys never normalized
    pub exclusions: Vec<String>,
}

impl Default for CostConfig {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            suffixes: owned(cost::DEFAULT_SUFFIXES),
            breakdown_containers: owned(cost::DEFAULT_BREAKDOWN_CONTAINERS),
            exclusions: owned(cost::DEFAULT_EXCLUSIONS),
        }
    }
}

// =============================================================================
// Weather Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    /// Days ahead the live forecast provider covers
    pub horizon_days: u32,

    /// Concurrent destination lookups (capped by destination count)
    pub max_concurrency: usize,

    /// Timeout per external call
    pub request_timeout_secs: u64,

    pub forecast_base_url: String,
    pub geocoding_base_url: String,
    pub archive_base_url: String,
    pub user_agent: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            horizon_days: weather::DEFAULT_HORIZON_DAYS,
            max_concurrency: weather::DEFAULT_MAX_CONCURRENCY,
            request_timeout_secs: weather::DEFAULT_REQUEST_TIMEOUT_SECS,
            forecast_base_url: network::OPEN_METEO_FORECAST_BASE.to_string(),
            geocoding_base_url: network::OPEN_METEO_GEOCODING_BASE.to_string(),
            archive_base_url: network::OPEN_METEO_ARCHIVE_BASE.to_string(),
            user_agent: network::USER_AGENT.to_string(),
        }
    }
}

impl WeatherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.parser.sandbox_timeout(), Duration::from_secs(1));
        assert_eq!(config.weather.horizon_days, 14);
        assert!(config.cost.suffixes.contains(&"cost".to_string()));
    }

    #[test]
    fn test_rejects_zero_horizon() {
        let mut config = Config::default();
        config.weather.horizon_days = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("horizon_days"));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = Config::default();
        config.weather.forecast_base_url = "file:///etc/passwd".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_rejects_oversized_sandbox_timeout() {
        let mut config = Config::default();
        config.parser.sandbox_timeout_ms = 60_000;
        assert!(config.validate().is_err());
    }
}
