//! Page storage used by URL generation and propagation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::page::Page;

/// Read and write access to pages.
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// The page with `uid`.
    async fn find(&self, uid: &str) -> Result<Option<Page>>;

    /// Direct children of the page with `uid`.
    async fn children(&self, uid: &str) -> Result<Vec<Page>>;

    /// The ancestor of `page` at `level`, if `page` is deeper than it.
    async fn ancestor(&self, page: &Page, level: u32) -> Result<Option<Page>>;

    /// A non-deleted page of the tree `root` with `url`, other than `exclude_uid`.
    async fn find_by_url(&self, root: &str, url: &str, exclude_uid: &str) -> Result<Option<Page>>;

    /// URLs starting with `prefix` among non-deleted pages of the tree `root`,
    /// other than `exclude_uid`.
    async fn urls_like(&self, root: &str, prefix: &str, exclude_uid: &str) -> Result<Vec<String>>;

    /// Insert or replace a page.
    async fn save(&self, page: &Page) -> Result<()>;
}

/// Pages kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryPageRepository {
    pages: RwLock<BTreeMap<String, Page>>,
}

impl MemoryPageRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding `pages`.
    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Self {
        let pages = pages
            .into_iter()
            .map(|page| (page.uid.clone(), page))
            .collect();
        Self {
            pages: RwLock::new(pages),
        }
    }

    fn candidates<'a>(
        pages: &'a BTreeMap<String, Page>,
        root: &'a str,
        exclude_uid: &'a str,
    ) -> impl Iterator<Item = &'a Page> {
        pages
            .values()
            .filter(move |page| page.root == root && page.uid != exclude_uid && !page.is_deleted())
    }
}

#[async_trait]
impl PageRepository for MemoryPageRepository {
    async fn find(&self, uid: &str) -> Result<Option<Page>> {
        Ok(self.pages.read().await.get(uid).cloned())
    }

    async fn children(&self, uid: &str) -> Result<Vec<Page>> {
        Ok(self
            .pages
            .read()
            .await
            .values()
            .filter(|page| page.parent.as_deref() == Some(uid))
            .cloned()
            .collect())
    }

    async fn ancestor(&self, page: &Page, level: u32) -> Result<Option<Page>> {
        if page.level <= level {
            return Ok(None);
        }
        let pages = self.pages.read().await;
        let mut current = page.parent.as_deref().and_then(|uid| pages.get(uid));
        while let Some(node) = current {
            if node.level == level {
                return Ok(Some(node.clone()));
            }
            if node.level < level {
                break;
            }
            current = node.parent.as_deref().and_then(|uid| pages.get(uid));
        }
        Ok(None)
    }

    async fn find_by_url(&self, root: &str, url: &str, exclude_uid: &str) -> Result<Option<Page>> {
        let pages = self.pages.read().await;
        Ok(Self::candidates(&pages, root, exclude_uid)
            .find(|page| page.url.as_deref() == Some(url))
            .cloned())
    }

    async fn urls_like(&self, root: &str, prefix: &str, exclude_uid: &str) -> Result<Vec<String>> {
        let pages = self.pages.read().await;
        Ok(Self::candidates(&pages, root, exclude_uid)
            .filter_map(|page| page.url.clone())
            .filter(|url| url.starts_with(prefix))
            .collect())
    }

    async fn save(&self, page: &Page) -> Result<()> {
        self.pages
            .write()
            .await
            .insert(page.uid.clone(), page.clone());
        Ok(())
    }
}
