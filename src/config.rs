//! Configuration for the patent number resolver

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search index fields and limits used when resolving grant and publication numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Index field holding the grant (patent) number
    pub grant_query_field: String,

    /// Index field holding the earliest publication number
    pub publication_query_field: String,

    /// Index field holding the application number
    pub application_query_field: String,

    /// Country prefix the index expects on publication numbers
    pub publication_prefix: String,

    /// Kind code appended to bare publication numbers
    pub publication_kind_code: String,

    /// Upper bound on a single search call (seconds); no bound when unset
    pub query_timeout_secs: Option<u64>,
}

impl ResolverConfig {
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.grant_query_field.trim().is_empty() {
            return Err("grant_query_field must not be empty".to_string());
        }
        if self.publication_query_field.trim().is_empty() {
            return Err("publication_query_field must not be empty".to_string());
        }
        if self.application_query_field.trim().is_empty() {
            return Err("application_query_field must not be empty".to_string());
        }
        if self.query_timeout_secs == Some(0) {
            return Err("query_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            grant_query_field: "applicationMetaData.patentNumber".to_string(),
            publication_query_field: "applicationMetaData.earliestPublicationNumber".to_string(),
            application_query_field: "applicationNumberText".to_string(),
            publication_prefix: "US".to_string(),
            publication_kind_code: "A1".to_string(),
            query_timeout_secs: None,
        }
    }
}
