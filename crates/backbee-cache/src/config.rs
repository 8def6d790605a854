//! Cache adapter options.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lifetime::LifetimePolicy;

/// Default context of the database adapter.
pub const DEFAULT_CONTEXT: &str = "default";

/// Default table of the database adapter.
pub const DEFAULT_TABLE: &str = "cache";

/// Options shared by every adapter, plus the database adapter's own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Smallest lifetime, in seconds, a record may be saved with.
    #[serde(default)]
    pub min_lifetime: Option<i64>,

    /// Largest lifetime, in seconds. Infinite lifetimes are capped to it too.
    #[serde(default)]
    pub max_lifetime: Option<i64>,

    /// Database connection URL (e.g. `sqlite://cache.db?mode=rwc`).
    #[serde(default)]
    pub dbal: Option<String>,

    /// Namespace of ids and tags in a shared table.
    #[serde(default = "default_context")]
    pub context: String,

    /// Table holding the records.
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_context() -> String {
    DEFAULT_CONTEXT.to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            min_lifetime: None,
            max_lifetime: None,
            dbal: None,
            context: default_context(),
            table: default_table(),
        }
    }
}

impl CacheConfig {
    /// Check bounds and the table name.
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_lifetime, self.max_lifetime)
            && min > max
        {
            return Err(Error::invalid_option(format!(
                "min_lifetime ({min}) exceeds max_lifetime ({max})"
            )));
        }
        let valid_table = !self.table.is_empty()
            && self
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_table {
            return Err(Error::invalid_option(format!(
                "invalid table name '{}'",
                self.table
            )));
        }
        Ok(())
    }

    /// The lifetime bounds as a policy.
    pub fn lifetime_policy(&self) -> LifetimePolicy {
        LifetimePolicy::new(self.min_lifetime, self.max_lifetime)
    }
}
