//! ACL configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::hierarchy::DEFAULT_CONTENT_BASE_TYPE;

/// Configuration of the ACL manager and voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclConfig {
    /// Types whose class-scope ACE is skipped by the permission fallback.
    #[serde(default)]
    pub class_fallback_exclusions: BTreeSet<String>,

    /// Abstract base type of every content type.
    #[serde(default = "default_content_base_type")]
    pub content_base_type: String,
}

fn default_content_base_type() -> String {
    DEFAULT_CONTENT_BASE_TYPE.to_string()
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            class_fallback_exclusions: BTreeSet::new(),
            content_base_type: default_content_base_type(),
        }
    }
}

impl AclConfig {
    /// Whether `kind` skips the class-scope fallback.
    pub fn is_excluded(&self, kind: &str) -> bool {
        self.class_fallback_exclusions.contains(kind)
    }
}
