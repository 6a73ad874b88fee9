//! Engine configuration management.
//!
//! Consolidates environment variable reads and provides validated configuration.

/// Game engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Longest secret code a game may request
    pub max_code_length: usize,

    /// Most distinct symbols a pool may hold
    pub max_pool_size: usize,

    /// Pending submissions buffered per game actor
    pub actor_inbox_capacity: usize,

    /// Seconds a game actor waits for work before retiring
    pub actor_idle_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_code_length: 20,
            max_pool_size: 64,
            actor_inbox_capacity: 64,
            actor_idle_timeout_secs: 300,
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `CODEBREAKER_MAX_CODE_LENGTH`: Longest code (default: 20)
    /// - `CODEBREAKER_MAX_POOL_SIZE`: Largest pool (default: 64)
    /// - `CODEBREAKER_ACTOR_INBOX_CAPACITY`: Actor inbox size (default: 64)
    /// - `CODEBREAKER_ACTOR_IDLE_TIMEOUT_SECS`: Actor idle timeout (default: 300)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the resulting values fail [`EngineConfig::validate`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            max_code_length: parse_env_or("CODEBREAKER_MAX_CODE_LENGTH", defaults.max_code_length),
            max_pool_size: parse_env_or("CODEBREAKER_MAX_POOL_SIZE", defaults.max_pool_size),
            actor_inbox_capacity: parse_env_or(
                "CODEBREAKER_ACTOR_INBOX_CAPACITY",
                defaults.actor_inbox_capacity,
            ),
            actor_idle_timeout_secs: parse_env_or(
                "CODEBREAKER_ACTOR_IDLE_TIMEOUT_SECS",
                defaults.actor_idle_timeout_secs,
            ),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_code_length == 0 {
            return Err(ConfigError::Invalid {
                var: "CODEBREAKER_MAX_CODE_LENGTH".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.max_pool_size == 0 {
            return Err(ConfigError::Invalid {
                var: "CODEBREAKER_MAX_POOL_SIZE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        // tokio::sync::mpsc::channel panics on zero capacity
        if self.actor_inbox_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "CODEBREAKER_ACTOR_INBOX_CAPACITY".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn actor_idle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.actor_idle_timeout_secs)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
pub(crate) fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparsable {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        // SAFETY: tests touching the environment run under #[serial]
        unsafe {
            std::env::remove_var("CODEBREAKER_MAX_CODE_LENGTH");
            std::env::remove_var("CODEBREAKER_MAX_POOL_SIZE");
            std::env::remove_var("CODEBREAKER_ACTOR_INBOX_CAPACITY");
            std::env::remove_var("CODEBREAKER_ACTOR_IDLE_TIMEOUT_SECS");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        assert_eq!(EngineConfig::from_env().unwrap(), EngineConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("CODEBREAKER_MAX_CODE_LENGTH", "8");
            std::env::set_var("CODEBREAKER_ACTOR_IDLE_TIMEOUT_SECS", "5");
        }

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.max_code_length, 8);
        assert_eq!(config.actor_idle_timeout_secs, 5);
        assert_eq!(config.max_pool_size, 64);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_unparsable_falls_back() {
        clear_env();
        unsafe {
            std::env::set_var("CODEBREAKER_MAX_POOL_SIZE", "lots");
        }

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.max_pool_size, 64);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_zero_capacity() {
        clear_env();
        unsafe {
            std::env::set_var("CODEBREAKER_ACTOR_INBOX_CAPACITY", "0");
        }

        let err = EngineConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "CODEBREAKER_ACTOR_INBOX_CAPACITY"));
        clear_env();
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "postgres://user@host/db".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("postgres://"));
    }
}
