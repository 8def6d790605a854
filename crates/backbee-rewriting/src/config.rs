//! Rewriting configuration.
//!
//! Keys keep their BackBee spelling:
//!
//! ```toml
//! preserve-online = true
//! preserve-unicity = true
//!
//! [scheme]
//! _root_ = "/"
//! _default_ = "$parent/$title"
//!
//! [scheme._layout_]
//! blog = "/blog/$date/$title"
//!
//! [scheme._content_]
//! Article = "$parent/$content->slug"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// URL rewriting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewritingConfig {
    /// Keep the URL of online pages unless regeneration is forced.
    #[serde(rename = "preserve-online", default = "default_true")]
    pub preserve_online: bool,

    /// Suffix colliding URLs with a number.
    #[serde(rename = "preserve-unicity", default = "default_true")]
    pub preserve_unicity: bool,

    /// URL templates.
    #[serde(default)]
    pub scheme: SchemeConfig,
}

fn default_true() -> bool {
    true
}

impl Default for RewritingConfig {
    fn default() -> Self {
        Self {
            preserve_online: true,
            preserve_unicity: true,
            scheme: SchemeConfig::default(),
        }
    }
}

/// URL templates by scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeConfig {
    /// Template for root pages.
    #[serde(rename = "_root_", default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Template used when nothing more specific applies.
    #[serde(rename = "_default_", default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Templates by layout id.
    #[serde(rename = "_layout_", default)]
    pub layout: BTreeMap<String, String>,

    /// Templates by short content type name.
    #[serde(rename = "_content_", default)]
    pub content: BTreeMap<String, String>,
}
