//! Retrofitter configuration

use crate::error::RetrofitError;
use retrofit_resolve::{MatchPolicy, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};

/// Where resolutions are memoized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Recompute every resolution
    Disabled,

    /// Use the process-wide cache
    #[default]
    Shared,

    /// Private cache per retrofitter
    Dedicated,
}

/// Retrofitter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrofitConfig {
    /// Resolution caching strategy
    pub cache: CachePolicy,

    /// Max resolutions held by a dedicated cache
    pub cache_capacity: u64,

    /// A `unit` contract accepts a method with any return type
    pub unit_return_accepts_any: bool,

    /// Attempt each distinct environment once while materializing
    pub skip_duplicate_environments: bool,
}

impl RetrofitConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With cache policy
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    /// With dedicated cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// With unit-return leniency
    #[inline]
    #[must_use]
    pub fn with_unit_return_accepts_any(mut self, accept: bool) -> Self {
        self.unit_return_accepts_any = accept;
        self
    }

    /// With duplicate environment skipping
    #[inline]
    #[must_use]
    pub fn with_skip_duplicate_environments(mut self, skip: bool) -> Self {
        self.skip_duplicate_environments = skip;
        self
    }

    /// Matching policy derived from this configuration
    #[inline]
    #[must_use]
    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            unit_return_accepts_any: self.unit_return_accepts_any,
        }
    }

    /// Parse configuration from JSON; missing fields take defaults
    ///
    /// # Errors
    /// Returns [`RetrofitError::Config`] on malformed input
    pub fn from_json(json: &str) -> Result<Self, RetrofitError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for RetrofitConfig {
    fn default() -> Self {
        Self {
            cache: CachePolicy::Shared,
            cache_capacity: DEFAULT_CAPACITY,
            unit_return_accepts_any: true,
            skip_duplicate_environments: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = RetrofitConfig::new();
        assert_eq!(config.cache, CachePolicy::Shared);
        assert_eq!(config.cache_capacity, 10_000);
        assert!(config.unit_return_accepts_any);
        assert!(config.skip_duplicate_environments);
        assert!(config.match_policy().unit_return_accepts_any);
    }

    #[test]
    fn config_builders() {
        let config = RetrofitConfig::new()
            .with_cache(CachePolicy::Dedicated)
            .with_cache_capacity(64)
            .with_unit_return_accepts_any(false)
            .with_skip_duplicate_environments(false);

        assert_eq!(config.cache, CachePolicy::Dedicated);
        assert_eq!(config.cache_capacity, 64);
        assert!(!config.match_policy().unit_return_accepts_any);
        assert!(!config.skip_duplicate_environments);
    }

    #[test]
    fn config_from_partial_json() {
        let config =
            RetrofitConfig::from_json(r#"{ "cache": "disabled", "cache_capacity": 5 }"#).unwrap();
        assert_eq!(config.cache, CachePolicy::Disabled);
        assert_eq!(config.cache_capacity, 5);
        assert!(config.unit_return_accepts_any);
    }

    #[test]
    fn config_json_roundtrip() {
        let config = RetrofitConfig::new().with_cache(CachePolicy::Dedicated);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(RetrofitConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn config_rejects_unknown_policy() {
        let result = RetrofitConfig::from_json(r#"{ "cache": "sometimes" }"#);
        assert!(matches!(result, Err(RetrofitError::Config(_))));
    }
}
