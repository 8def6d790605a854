//! URL propagation when pages are flushed.
//!
//! A page whose URL changes may change the URLs of its descendants (schemes
//! commonly embed `$parent`), so every updated page queues its children.
//! Each page is handled at most once per flush.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::Result;
use crate::generator::UrlGenerator;
use crate::page::{Content, Page, PageState};

/// A page about to be persisted.
#[derive(Clone)]
pub struct PageChange {
    /// The page, with its pending values.
    pub page: Page,
    /// Main content of the page, used by content schemes.
    pub content: Option<Arc<dyn Content>>,
    /// Whether the URL was edited explicitly.
    pub url_edited: bool,
    /// State before the change, when the state changed.
    pub previous_state: Option<PageState>,
}

impl PageChange {
    /// A change to `page` with no explicit URL or state edit.
    pub fn new(page: Page) -> Self {
        Self {
            page,
            content: None,
            url_edited: false,
            previous_state: None,
        }
    }

    /// Attach the page's main content.
    pub fn with_content(mut self, content: Arc<dyn Content>) -> Self {
        self.content = Some(content);
        self
    }

    /// Mark the URL as explicitly edited.
    pub fn with_url_edited(mut self) -> Self {
        self.url_edited = true;
        self
    }

    /// Record the state the page is leaving.
    pub fn with_previous_state(mut self, state: PageState) -> Self {
        self.previous_state = Some(state);
        self
    }

    /// Whether the page is being taken offline.
    pub fn goes_offline(&self) -> bool {
        self.previous_state
            .is_some_and(|state| state.contains(PageState::ONLINE))
            && !self.page.state.contains(PageState::ONLINE)
    }
}

impl std::fmt::Debug for PageChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageChange")
            .field("page", &self.page.uid)
            .field("url_edited", &self.url_edited)
            .field("previous_state", &self.previous_state)
            .finish_non_exhaustive()
    }
}

/// Keeps page URLs in line with the rewriting schemes.
#[derive(Debug, Clone)]
pub struct RewritingListener {
    generator: UrlGenerator,
}

impl RewritingListener {
    /// Create a listener.
    pub fn new(generator: UrlGenerator) -> Self {
        Self { generator }
    }

    /// Update the URLs of `changes` and of the descendants of every page
    /// whose URL changed.
    ///
    /// Parents are handled before their children. An explicitly edited URL
    /// is only made unique; other pages are regenerated, forcibly when they
    /// go offline. Updated pages are saved and returned.
    pub async fn on_flush(&self, changes: Vec<PageChange>) -> Result<Vec<Page>> {
        let mut order: Vec<String> = Vec::with_capacity(changes.len());
        let mut pending: HashMap<String, PageChange> = HashMap::new();
        let mut by_level = changes;
        by_level.sort_by_key(|change| change.page.level);
        for change in by_level {
            order.push(change.page.uid.clone());
            pending.insert(change.page.uid.clone(), change);
        }

        let mut processed = HashSet::new();
        let mut updated = Vec::new();
        for uid in order {
            let Some(change) = pending.remove(&uid) else {
                continue;
            };
            let mut stack = vec![change];
            while let Some(change) = stack.pop() {
                if !processed.insert(change.page.uid.clone()) {
                    continue;
                }
                let Some(page) = self.update_url(change).await? else {
                    continue;
                };
                let children = self.generator.repository().children(&page.uid).await?;
                for child in children.into_iter().rev() {
                    let change = pending
                        .remove(&child.uid)
                        .unwrap_or_else(|| PageChange::new(child));
                    stack.push(change);
                }
                updated.push(page);
            }
        }
        Ok(updated)
    }

    /// Compute and save the URL of one page; `None` when it did not change.
    async fn update_url(&self, change: PageChange) -> Result<Option<Page>> {
        let force = change.goes_offline();
        let PageChange {
            mut page,
            content,
            url_edited,
            ..
        } = change;

        let current = page.url_or_empty().to_string();
        let url = if url_edited && !current.is_empty() {
            self.generator.get_uniqueness(&page, &current).await?
        } else {
            self.generator
                .generate(&page, content.as_deref(), force, true)
                .await?
        };

        if url == current {
            return Ok(None);
        }
        log::debug!("Page {} moves from '{current}' to '{url}'", page.uid);
        page.url = Some(url);
        self.generator.repository().save(&page).await?;
        Ok(Some(page))
    }
}
