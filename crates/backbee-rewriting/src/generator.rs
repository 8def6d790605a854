//! URL generation from rewriting schemes.
//!
//! A scheme is a template whose placeholders are replaced by page data:
//!
//! | placeholder      | replacement                                       |
//! |------------------|---------------------------------------------------|
//! | `$parent`        | URL of the parent page (empty for roots)          |
//! | `$title`         | urlized page title                                |
//! | `$datetime`      | creation time as `yymmddHHMMSS`                   |
//! | `$date`          | creation date as `yymmdd`                         |
//! | `$time`          | creation time as `HHMMSS`                         |
//! | `$uid`           | page uid                                          |
//! | `$content->name` | urlized content property, empty when unreadable   |
//! | `$ancestor[N]`   | URL of the level-N ancestor, empty when too close |

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, LazyLock};

use backbee_core::{collapse_slashes, urlize};
use regex::{Captures, Regex};

use crate::config::RewritingConfig;
use crate::error::{Error, Result};
use crate::page::{Content, Page};
use crate::repository::PageRepository;

static CONTENT_PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$content->([a-z]+)").expect("Invalid content placeholder regex")
});

static ANCESTOR_PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$ancestor\[([0-9]+)\]").expect("Invalid ancestor placeholder regex")
});

/// Computes page URLs.
#[derive(Clone)]
pub struct UrlGenerator {
    config: RewritingConfig,
    repository: Arc<dyn PageRepository>,
}

impl UrlGenerator {
    /// Create a generator over a page repository.
    pub fn new(config: RewritingConfig, repository: Arc<dyn PageRepository>) -> Self {
        Self { config, repository }
    }

    /// The configuration in use.
    pub fn config(&self) -> &RewritingConfig {
        &self.config
    }

    /// The page repository.
    pub fn repository(&self) -> &Arc<dyn PageRepository> {
        &self.repository
    }

    /// Compute the URL of `page`.
    ///
    /// The first applicable rule wins:
    ///
    /// 1. the current URL of an online page, when online URLs are preserved
    ///    and `force` is not set;
    /// 2. the root scheme, for root pages;
    /// 3. the scheme of the page's layout;
    /// 4. the scheme of the content's short type name;
    /// 5. the default scheme;
    /// 6. the current URL;
    /// 7. [`Error::MissingScheme`], or `/<uid>` when
    ///    `exception_on_missing_scheme` is unset.
    pub async fn generate(
        &self,
        page: &Page,
        content: Option<&dyn Content>,
        force: bool,
        exception_on_missing_scheme: bool,
    ) -> Result<String> {
        let current = page.url_or_empty();
        if !force && self.config.preserve_online && !current.is_empty() && page.is_online() {
            return Ok(current.to_string());
        }

        if let Some(scheme) = self.select_scheme(page, content) {
            log::debug!("Rewriting page {} with scheme '{scheme}'", page.uid);
            return self.do_generate(scheme, page, content).await;
        }

        if !current.is_empty() {
            return Ok(current.to_string());
        }
        if exception_on_missing_scheme {
            return Err(Error::missing_scheme(&page.uid));
        }
        Ok(format!("/{}", page.uid))
    }

    fn select_scheme(&self, page: &Page, content: Option<&dyn Content>) -> Option<&str> {
        let schemes = &self.config.scheme;
        if page.is_root()
            && let Some(scheme) = &schemes.root
        {
            return Some(scheme);
        }
        if let Some(scheme) = page
            .layout
            .as_deref()
            .and_then(|layout| schemes.layout.get(layout))
        {
            return Some(scheme);
        }
        if let Some(scheme) = content.and_then(|c| schemes.content.get(c.short_type_name())) {
            return Some(scheme);
        }
        schemes.default.as_deref()
    }

    /// Apply `scheme` to `page`, then make the result unique.
    pub async fn do_generate(
        &self,
        scheme: &str,
        page: &Page,
        content: Option<&dyn Content>,
    ) -> Result<String> {
        let parent_url = match page.parent.as_deref() {
            Some(uid) => self
                .repository
                .find(uid)
                .await?
                .and_then(|parent| parent.url)
                .unwrap_or_default(),
            None => String::new(),
        };

        let url = scheme
            .replace("$parent", &parent_url)
            .replace("$title", &urlize(&page.title))
            .replace("$datetime", &page.created.format("%y%m%d%H%M%S").to_string())
            .replace("$date", &page.created.format("%y%m%d").to_string())
            .replace("$time", &page.created.format("%H%M%S").to_string())
            .replace("$uid", &page.uid);

        let url = CONTENT_PLACEHOLDER_RE.replace_all(&url, |caps: &Captures| {
            content
                .and_then(|c| c.property(&caps[1]))
                .map(|value| urlize(&value))
                .unwrap_or_default()
        });

        let levels: BTreeSet<u32> = ANCESTOR_PLACEHOLDER_RE
            .captures_iter(&url)
            .filter_map(|caps| caps[1].parse().ok())
            .collect();
        let mut ancestors = HashMap::new();
        for level in levels {
            let ancestor_url = self
                .repository
                .ancestor(page, level)
                .await?
                .and_then(|ancestor| ancestor.url)
                .unwrap_or_default();
            ancestors.insert(level, ancestor_url);
        }
        let url = ANCESTOR_PLACEHOLDER_RE.replace_all(&url, |caps: &Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(|level| ancestors.get(&level))
                .cloned()
                .unwrap_or_default()
        });

        self.get_uniqueness(page, &collapse_slashes(&url)).await
    }

    /// Make `url` unique among the non-deleted pages of `page`'s tree.
    ///
    /// A taken URL gets the next free numeric suffix: `/url` becomes
    /// `/url-N`, a folder `/url/` becomes `/url-N/`, N being one more than
    /// the largest suffix in use.
    pub async fn get_uniqueness(&self, page: &Page, url: &str) -> Result<String> {
        if !self.config.preserve_unicity {
            return Ok(url.to_string());
        }
        if self
            .repository
            .find_by_url(&page.root, url, &page.uid)
            .await?
            .is_none()
        {
            return Ok(url.to_string());
        }

        let (base, folder) = match url.strip_suffix('/') {
            Some(base) => (base, "/"),
            None => (url, ""),
        };
        let suffixed = Regex::new(&format!(
            "^{}-([0-9]+){}$",
            regex::escape(base),
            regex::escape(folder)
        ))?;

        let existing = self
            .repository
            .urls_like(&page.root, &format!("{base}-"), &page.uid)
            .await?;
        let max = existing
            .iter()
            .filter_map(|candidate| suffixed.captures(candidate))
            .filter_map(|caps| caps[1].parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        let next = max
            .checked_add(1)
            .ok_or_else(|| Error::suffix_exhausted(url))?;
        let unique = format!("{base}-{next}{folder}");
        log::debug!("URL {url} is taken, using {unique} for page {}", page.uid);
        Ok(unique)
    }
}

impl std::fmt::Debug for UrlGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::config::SchemeConfig;
    use crate::page::{PageState, PropertyContent};
    use crate::repository::MemoryPageRepository;

    fn generator(scheme: SchemeConfig, pages: Vec<Page>) -> UrlGenerator {
        let config = RewritingConfig {
            scheme,
            ..RewritingConfig::default()
        };
        UrlGenerator::new(config, Arc::new(MemoryPageRepository::from_pages(pages)))
    }

    fn home() -> Page {
        Page::new("home", "Home").with_url("/")
    }

    // -------------------------------------------------------------------------
    // do_generate
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_parent_uid_title() {
        let parent = Page::new("parent", "Parent").child_of(&home()).with_url("/parent/");
        let page = Page::new("u1", "My Title").child_of(&parent);
        let generator = generator(SchemeConfig::default(), vec![home(), parent]);

        let url = generator
            .do_generate("$parent/$uid/$title", &page, None)
            .await
            .unwrap();
        assert_eq!(url, "/parent/u1/my-title");
    }

    #[tokio::test]
    async fn test_date_placeholders() {
        let created = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let page = Page::new("p", "P").child_of(&home()).with_created(created);
        let generator = generator(SchemeConfig::default(), vec![home()]);

        let url = generator
            .do_generate("/$datetime/$date/$time", &page, None)
            .await
            .unwrap();
        assert_eq!(url, "/240309140507/240309/140507");
    }

    #[tokio::test]
    async fn test_content_placeholder() {
        let page = Page::new("p", "P").child_of(&home());
        let generator = generator(SchemeConfig::default(), vec![home()]);
        let content = PropertyContent::new("Article").with_property("slug", "Hello World");

        let url = generator
            .do_generate("/news/$content->slug/$Content->missing", &page, Some(&content))
            .await
            .unwrap();
        assert_eq!(url, "/news/hello-world/");

        let url = generator
            .do_generate("/news/$content->slug", &page, None)
            .await
            .unwrap();
        assert_eq!(url, "/news/");
    }

    #[tokio::test]
    async fn test_ancestor_placeholder() {
        let section = Page::new("section", "Section").child_of(&home()).with_url("/section");
        let sub = Page::new("sub", "Sub").child_of(&section).with_url("/section/sub");
        let page = Page::new("p", "Leaf").child_of(&sub);
        let generator = generator(SchemeConfig::default(), vec![home(), section, sub]);

        let url = generator
            .do_generate("$ancestor[1]/$title/$ancestor[7]", &page, None)
            .await
            .unwrap();
        assert_eq!(url, "/section/leaf/");
    }

    // -------------------------------------------------------------------------
    // generate
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_online_url_is_preserved_unless_forced() {
        let scheme = SchemeConfig {
            default: Some("/$title".to_string()),
            ..SchemeConfig::default()
        };
        let page = Page::new("p", "New Title")
            .child_of(&home())
            .with_url("/old")
            .with_state(PageState::ONLINE);
        let generator = generator(scheme, vec![home()]);

        assert_eq!(generator.generate(&page, None, false, true).await.unwrap(), "/old");
        assert_eq!(generator.generate(&page, None, true, true).await.unwrap(), "/new-title");
    }

    #[tokio::test]
    async fn test_scheme_precedence() {
        let mut scheme = SchemeConfig {
            root: Some("/".to_string()),
            default: Some("/default/$title".to_string()),
            ..SchemeConfig::default()
        };
        scheme.layout.insert("blog".to_string(), "/blog/$title".to_string());
        scheme.content.insert("Article".to_string(), "/article/$title".to_string());
        let generator = generator(scheme, vec![]);
        let article = PropertyContent::new("BackBee\\ClassContent\\Article");

        let root = Page::new("root", "Root");
        assert_eq!(generator.generate(&root, None, false, true).await.unwrap(), "/");

        let parent = Page::new("root", "Root");
        let blog = Page::new("b", "Post").child_of(&parent).with_layout("blog");
        assert_eq!(
            generator.generate(&blog, Some(&article), false, true).await.unwrap(),
            "/blog/post"
        );

        let plain = Page::new("a", "Story").child_of(&parent).with_layout("other");
        assert_eq!(
            generator.generate(&plain, Some(&article), false, true).await.unwrap(),
            "/article/story"
        );
        assert_eq!(
            generator.generate(&plain, None, false, true).await.unwrap(),
            "/default/story"
        );
    }

    #[tokio::test]
    async fn test_missing_scheme() {
        let generator = generator(SchemeConfig::default(), vec![]);
        let page = Page::new("p1", "P").child_of(&home());

        let err = generator.generate(&page, None, false, true).await.unwrap_err();
        assert!(matches!(err, Error::MissingScheme { ref uid } if uid == "p1"));
        assert_eq!(generator.generate(&page, None, false, false).await.unwrap(), "/p1");

        let kept = page.with_url("/kept");
        assert_eq!(generator.generate(&kept, None, false, true).await.unwrap(), "/kept");
    }

    // -------------------------------------------------------------------------
    // get_uniqueness
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_uniqueness_uses_next_suffix() {
        let first = Page::new("a", "A").child_of(&home()).with_url("/url");
        let second = Page::new("b", "B").child_of(&home()).with_url("/url-3");
        let generator = generator(SchemeConfig::default(), vec![home(), first, second]);
        let third = Page::new("c", "C").child_of(&home());

        assert_eq!(generator.get_uniqueness(&third, "/url").await.unwrap(), "/url-4");
        assert_eq!(generator.get_uniqueness(&third, "/free").await.unwrap(), "/free");
    }

    #[tokio::test]
    async fn test_uniqueness_of_folders() {
        let first = Page::new("a", "A").child_of(&home()).with_url("/dir/");
        let generator = generator(SchemeConfig::default(), vec![home(), first]);
        let other = Page::new("b", "B").child_of(&home());

        assert_eq!(generator.get_uniqueness(&other, "/dir/").await.unwrap(), "/dir-1/");
    }

    #[tokio::test]
    async fn test_uniqueness_with_largest_suffix_taken() {
        let first = Page::new("a", "A").child_of(&home()).with_url("/url");
        let last = Page::new("b", "B")
            .child_of(&home())
            .with_url(format!("/url-{}", u64::MAX));
        let generator = generator(SchemeConfig::default(), vec![home(), first, last]);
        let page = Page::new("c", "C").child_of(&home());

        let err = generator.get_uniqueness(&page, "/url").await.unwrap_err();
        assert!(matches!(err, Error::SuffixExhausted { ref url } if url == "/url"));
    }

    #[tokio::test]
    async fn test_uniqueness_ignores_self_and_other_trees() {
        let page = Page::new("a", "A").child_of(&home()).with_url("/url");
        let foreign = Page::new("x", "X").with_url("/url");
        let generator = generator(SchemeConfig::default(), vec![home(), page.clone(), foreign]);

        assert_eq!(generator.get_uniqueness(&page, "/url").await.unwrap(), "/url");
    }

    #[tokio::test]
    async fn test_uniqueness_disabled() {
        let taken = Page::new("a", "A").child_of(&home()).with_url("/url");
        let config = RewritingConfig {
            preserve_unicity: false,
            ..RewritingConfig::default()
        };
        let generator = UrlGenerator::new(
            config,
            Arc::new(MemoryPageRepository::from_pages([home(), taken])),
        );
        let page = Page::new("b", "B").child_of(&home());
        assert_eq!(generator.get_uniqueness(&page, "/url").await.unwrap(), "/url");
    }
}
