//! Configuration of every BackBee component.
//!
//! ```toml
//! [acl]
//! class_fallback_exclusions = ["Bundle"]
//!
//! [cache]
//! max_lifetime = 86400
//! dbal = "sqlite://cache.db?mode=rwc"
//!
//! [rewriting]
//! preserve-online = true
//!
//! [rewriting.scheme]
//! _default_ = "$parent/$title"
//! ```
//!
//! Missing sections take their defaults.

use std::path::Path;

use backbee_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Aggregated configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackbeeConfig {
    /// ACL manager and voters.
    #[cfg(feature = "acl")]
    #[serde(default)]
    pub acl: backbee_acl::AclConfig,

    /// Cache adapters.
    #[cfg(feature = "cache")]
    #[serde(default)]
    pub cache: backbee_cache::CacheConfig,

    /// URL rewriting.
    #[cfg(feature = "rewriting")]
    #[serde(default)]
    pub rewriting: backbee_rewriting::RewritingConfig,
}

impl BackbeeConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::parse(format!("Failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        log::debug!("Loading configuration from {}", path.display());
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Parse { message } => Error::parse(format!("{}: {message}", path.display())),
            other => other,
        })
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        #[cfg(feature = "cache")]
        self.cache
            .validate()
            .map_err(|e| Error::config(e.to_string()))?;
        Ok(())
    }
}
