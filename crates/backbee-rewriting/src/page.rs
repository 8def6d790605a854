//! Pages and contents, as seen by URL rewriting.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Publication state of a page. No flag set means offline.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PageState: u8 {
        /// Published.
        const ONLINE = 1 << 0;
        /// Kept out of navigation.
        const HIDDEN = 1 << 1;
        /// In the trash.
        const DELETED = 1 << 2;
    }
}

/// A CMS page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Unique id.
    pub uid: String,
    /// Title, urlized by `$title`.
    pub title: String,
    /// Current URL, if any.
    pub url: Option<String>,
    /// Uid of the parent page; `None` for roots.
    pub parent: Option<String>,
    /// Uid of the tree root. A root is its own root.
    pub root: String,
    /// Depth in the tree, roots being at level 0.
    pub level: u32,
    /// Layout id.
    pub layout: Option<String>,
    /// Publication state.
    pub state: PageState,
    /// Creation time, used by `$date`, `$time` and `$datetime`.
    pub created: DateTime<Utc>,
}

impl Page {
    /// A new offline root page.
    pub fn new(uid: impl Into<String>, title: impl Into<String>) -> Self {
        let uid = uid.into();
        Self {
            root: uid.clone(),
            uid,
            title: title.into(),
            url: None,
            parent: None,
            level: 0,
            layout: None,
            state: PageState::empty(),
            created: Utc::now(),
        }
    }

    /// Make this page a child of `parent`.
    pub fn child_of(mut self, parent: &Page) -> Self {
        self.parent = Some(parent.uid.clone());
        self.root = parent.root.clone();
        self.level = parent.level + 1;
        self
    }

    /// Set the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the layout.
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// Set the state.
    pub fn with_state(mut self, state: PageState) -> Self {
        self.state = state;
        self
    }

    /// Set the creation time.
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    /// Whether the page has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether the page is published and not deleted.
    pub fn is_online(&self) -> bool {
        self.state.contains(PageState::ONLINE) && !self.is_deleted()
    }

    /// Whether the page is in the trash.
    pub fn is_deleted(&self) -> bool {
        self.state.contains(PageState::DELETED)
    }

    /// The URL, empty when unset.
    pub fn url_or_empty(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

/// A content whose properties can appear in URLs through `$content->name`.
pub trait Content: Send + Sync {
    /// Fully qualified type name; schemes match its short form.
    fn type_name(&self) -> &str;

    /// A property value, `None` when it cannot be read.
    fn property(&self, name: &str) -> Option<String>;

    /// The type name without its namespace.
    fn short_type_name(&self) -> &str {
        backbee_core::short_type_name(self.type_name())
    }
}

/// A content backed by a property map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyContent {
    type_name: String,
    properties: BTreeMap<String, String>,
}

impl PropertyContent {
    /// Create a content of type `type_name` with no properties.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Add a property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

impl Content for PropertyContent {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_page_is_offline_root() {
        let page = Page::new("home", "Home");
        assert!(page.is_root());
        assert!(!page.is_online());
        assert_eq!(page.root, "home");
        assert_eq!(page.level, 0);
        assert_eq!(page.url_or_empty(), "");
    }

    #[test]
    fn test_child_of() {
        let root = Page::new("home", "Home");
        let parent = Page::new("news", "News").child_of(&root);
        let child = Page::new("item", "Item").child_of(&parent);
        assert_eq!(child.parent.as_deref(), Some("news"));
        assert_eq!(child.root, "home");
        assert_eq!(child.level, 2);
        assert!(!child.is_root());
    }

    #[test]
    fn test_deleted_page_is_not_online() {
        let page = Page::new("p", "P").with_state(PageState::ONLINE | PageState::DELETED);
        assert!(page.is_deleted());
        assert!(!page.is_online());
    }

    #[test]
    fn test_property_content() {
        let content = PropertyContent::new("BackBee\\ClassContent\\Article").with_property("slug", "Hello");
        assert_eq!(content.short_type_name(), "Article");
        assert_eq!(content.property("slug").as_deref(), Some("Hello"));
        assert_eq!(content.property("missing"), None);
    }
}
