//! # Configuration Errors

use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    /// Config file is not valid JSON for the expected shape
    #[error("Invalid config JSON: {0}")]
    Parse(String),

    /// Default page size must be positive
    #[error("default_limit must be > 0")]
    ZeroDefaultLimit,

    /// Maximum page size below the default
    #[error("max_limit {max} is below default_limit {default}")]
    MaxBelowDefault { default: u64, max: u64 },

    /// The identity field (or a sub-path of it) can never be projected
    #[error("'{0}' belongs to the identity field and cannot be compulsory")]
    IdentityCompulsory(String),

    /// Deterministic pagination needs at least one fallback sort key
    #[error("default_sort must name at least one field")]
    EmptyDefaultSort,
}

impl ConfigError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "CHARITY_CONFIG_READ",
            ConfigError::Parse(_) => "CHARITY_CONFIG_PARSE",
            ConfigError::ZeroDefaultLimit
            | ConfigError::MaxBelowDefault { .. }
            | ConfigError::IdentityCompulsory(_)
            | ConfigError::EmptyDefaultSort => "CHARITY_CONFIG_INVALID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ConfigError::Parse("x".into()).code(), "CHARITY_CONFIG_PARSE");
        assert_eq!(ConfigError::ZeroDefaultLimit.code(), "CHARITY_CONFIG_INVALID");
    }

    #[test]
    fn test_display() {
        let err = ConfigError::MaxBelowDefault { default: 10, max: 5 };
        assert_eq!(err.to_string(), "max_limit 5 is below default_limit 10");
    }
}
