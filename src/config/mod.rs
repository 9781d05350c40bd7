//! # Service Configuration
//!
//! Policy for query normalization and settings for the HTTP listener.
//! Both are plain immutable values: build one, hand it to the normalizer or
//! server, and never mutate it afterwards. Several independently configured
//! normalizers can live in the same process.

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::query::is_descendant_of_any;

use serde::{Deserialize, Serialize};

/// Query normalization policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Field paths the parameter parser may turn into filter clauses
    /// (exact match, descendants are not implied)
    #[serde(default = "default_whitelist")]
    pub whitelist: BTreeSet<String>,

    /// Field paths that are never projected, together with their descendants
    #[serde(default)]
    pub private_fields: BTreeSet<String>,

    /// Field paths that are always projected
    #[serde(default = "default_compulsory_fields")]
    pub compulsory_fields: Vec<String>,

    /// Store-internal identity field (default: "_id")
    #[serde(default = "default_identity_field")]
    pub identity_field: String,

    /// Fallback ascending sort keys, in precedence order
    #[serde(default = "default_sort")]
    pub default_sort: Vec<String>,

    /// Page size used when none (or a non-positive one) is requested
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Upper bound on page size
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,

    /// The only API version served
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_whitelist() -> BTreeSet<String> {
    ["charityNumber", "subNumber", "registered", "mainCharity.income"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_compulsory_fields() -> Vec<String> {
    ["charityNumber", "subNumber", "registered", "name"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_identity_field() -> String {
    "_id".to_string()
}

fn default_sort() -> Vec<String> {
    vec!["charityNumber".to_string(), "subNumber".to_string()]
}

fn default_limit() -> u64 {
    10
}

fn default_max_limit() -> u64 {
    50
}

fn default_version() -> String {
    "v0.2.0".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            whitelist: default_whitelist(),
            private_fields: BTreeSet::new(),
            compulsory_fields: default_compulsory_fields(),
            identity_field: default_identity_field(),
            default_sort: default_sort(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            version: default_version(),
        }
    }
}

impl QueryConfig {
    /// Replace the private field set
    pub fn with_private_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.private_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the compulsory field list
    pub fn with_compulsory_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compulsory_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the filter whitelist
    pub fn with_whitelist<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Replace both page size bounds
    pub fn with_limits(mut self, default_limit: u64, max_limit: u64) -> Self {
        self.default_limit = default_limit;
        self.max_limit = max_limit;
        self
    }

    /// Check the policy is internally consistent
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_limit == 0 {
            return Err(ConfigError::ZeroDefaultLimit);
        }

        if self.max_limit < self.default_limit {
            return Err(ConfigError::MaxBelowDefault {
                default: self.default_limit,
                max: self.max_limit,
            });
        }

        let identity = [&self.identity_field];
        if let Some(path) = self
            .compulsory_fields
            .iter()
            .find(|path| is_descendant_of_any(path, identity))
        {
            return Err(ConfigError::IdentityCompulsory(path.clone()));
        }

        if self.default_sort.is_empty() {
            return Err(ConfigError::EmptyDefaultSort);
        }

        Ok(())
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 5000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// In-memory document store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Document fields searched by `$text` clauses
    #[serde(default = "default_text_fields")]
    pub text_fields: Vec<String>,
}

fn default_text_fields() -> Vec<String> {
    vec!["name".to_string()]
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            text_fields: default_text_fields(),
        }
    }
}

/// Root of the JSON configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

impl ServiceConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: ServiceConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.query.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_deployment() {
        let config = QueryConfig::default();
        assert!(config.whitelist.contains("mainCharity.income"));
        assert!(config.private_fields.is_empty());
        assert_eq!(
            config.compulsory_fields,
            vec!["charityNumber", "subNumber", "registered", "name"]
        );
        assert_eq!(config.default_sort, vec!["charityNumber", "subNumber"]);
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.max_limit, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_default() {
        let config = QueryConfig::default().with_limits(0, 50);
        assert_eq!(config.validate(), Err(ConfigError::ZeroDefaultLimit));
    }

    #[test]
    fn test_validate_rejects_max_below_default() {
        let config = QueryConfig::default().with_limits(20, 5);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MaxBelowDefault { default: 20, max: 5 })
        );
    }

    #[test]
    fn test_validate_rejects_compulsory_identity() {
        let config = QueryConfig::default().with_compulsory_fields(["_id", "name"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::IdentityCompulsory(_))
        ));
    }

    #[test]
    fn test_validate_rejects_compulsory_identity_sub_path() {
        let config = QueryConfig::default().with_compulsory_fields(["name", "_id.oid"]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::IdentityCompulsory("_id.oid".to_string()))
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ServiceConfig::from_json(
            r#"{"query": {"private_fields": ["trustees"], "max_limit": 100}}"#,
        )
        .unwrap();

        assert_eq!(config.query.max_limit, 100);
        assert_eq!(config.query.default_limit, 10);
        assert!(config.query.private_fields.contains("trustees"));
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.store.text_fields, vec!["name"]);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let result = ServiceConfig::from_json("{not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig {
            port: 8080,
            ..Default::default()
        };
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }
}
