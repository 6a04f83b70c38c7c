//! Engine configuration.
//!
//! Limits for slug derivation and input validation. Configuration is loaded
//! from environment variables with defaults suitable for most deployments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Tenancy engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenancyConfig {
    /// Attempts at inserting an auto-derived slug before failing with a
    /// conflict. Only lost uniqueness races count as attempts.
    pub slug_retry_limit: u32,

    /// Suffixed candidates probed per attempt (`name`, `name-2`, ...).
    pub slug_candidate_limit: u32,

    /// Maximum slug length.
    pub slug_max_length: usize,

    /// Maximum length of organization, business and integration names.
    pub name_max_length: usize,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            slug_retry_limit: 3,
            slug_candidate_limit: 100,
            slug_max_length: 50,
            name_max_length: 255,
        }
    }
}

impl TenancyConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TENANCY_SLUG_RETRY_LIMIT`: insert attempts for derived slugs (default: 3)
    /// - `TENANCY_SLUG_CANDIDATE_LIMIT`: candidates probed per attempt (default: 100)
    /// - `TENANCY_SLUG_MAX_LENGTH`: maximum slug length (default: 50)
    /// - `TENANCY_NAME_MAX_LENGTH`: maximum name length (default: 255)
    ///
    /// Unparseable values fall back to the default. The result is
    /// validated, so a parseable but unusable value is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();

        let config = Self {
            slug_retry_limit: env_parse("TENANCY_SLUG_RETRY_LIMIT")
                .unwrap_or(default.slug_retry_limit),
            slug_candidate_limit: env_parse("TENANCY_SLUG_CANDIDATE_LIMIT")
                .unwrap_or(default.slug_candidate_limit),
            slug_max_length: env_parse("TENANCY_SLUG_MAX_LENGTH")
                .unwrap_or(default.slug_max_length),
            name_max_length: env_parse("TENANCY_NAME_MAX_LENGTH")
                .unwrap_or(default.name_max_length),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every limit is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slug_retry_limit == 0 {
            return Err(invalid("slug_retry_limit", "must be at least 1"));
        }
        if self.slug_candidate_limit == 0 {
            return Err(invalid("slug_candidate_limit", "must be at least 1"));
        }
        // room for at least one character plus a "-NN" suffix
        if self.slug_max_length < 4 {
            return Err(invalid("slug_max_length", "must be at least 4"));
        }
        if self.name_max_length == 0 {
            return Err(invalid("name_max_length", "must be at least 1"));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TenancyConfig::default();
        assert_eq!(config.slug_retry_limit, 3);
        assert_eq!(config.slug_max_length, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = TenancyConfig {
            slug_retry_limit: 0,
            ..TenancyConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TenancyConfig {
            slug_max_length: 2,
            ..TenancyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    // both cases share one test so the environment is never mutated from
    // two test threads at once
    #[test]
    fn test_from_env() {
        std::env::set_var("TENANCY_NAME_MAX_LENGTH", "80");
        std::env::set_var("TENANCY_SLUG_RETRY_LIMIT", "not-a-number");

        let config = TenancyConfig::from_env().unwrap();
        assert_eq!(config.name_max_length, 80);
        assert_eq!(config.slug_retry_limit, 3);

        std::env::set_var("TENANCY_SLUG_MAX_LENGTH", "0");
        let result = TenancyConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "slug_max_length"
        ));

        std::env::remove_var("TENANCY_NAME_MAX_LENGTH");
        std::env::remove_var("TENANCY_SLUG_RETRY_LIMIT");
        std::env::remove_var("TENANCY_SLUG_MAX_LENGTH");
    }
}
