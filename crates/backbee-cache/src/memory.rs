//! In-memory cache adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::adapter::CacheAdapter;
use crate::lifetime::{LifetimePolicy, now};
use crate::record::{CacheRecord, Expiry, tagged};

/// Cache kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryCache {
    policy: LifetimePolicy,
    records: RwLock<HashMap<String, CacheRecord>>,
}

impl MemoryCache {
    /// Create an empty cache with unbounded lifetimes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache with lifetime bounds.
    pub fn with_policy(policy: LifetimePolicy) -> Self {
        Self {
            policy,
            records: RwLock::default(),
        }
    }

    /// Number of stored records, expired ones included.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CacheAdapter for MemoryCache {
    fn policy(&self) -> &LifetimePolicy {
        &self.policy
    }

    async fn load(&self, id: &str, bypass_check: bool, expire: Option<i64>) -> Option<String> {
        let at = expire.unwrap_or_else(now);
        let records = self.records.read().await;
        records
            .get(id)
            .filter(|record| record.loadable(bypass_check, at))
            .map(|record| record.data.clone())
    }

    async fn test(&self, id: &str) -> Option<Expiry> {
        let now = now();
        self.records.read().await.get(id)?.validity(now)
    }

    async fn save(
        &self,
        id: &str,
        data: &str,
        lifetime: Option<i64>,
        tag: Option<&str>,
        bypass_control: bool,
    ) -> bool {
        let record = CacheRecord {
            data: data.to_string(),
            tag: tag.map(str::to_string),
            expire: self.expire_time(lifetime, bypass_control),
            created: now(),
        };
        self.records.write().await.insert(id.to_string(), record);
        true
    }

    async fn remove(&self, id: &str) -> bool {
        self.records.write().await.remove(id);
        true
    }

    async fn clear(&self) -> bool {
        self.records.write().await.clear();
        true
    }

    async fn remove_by_tag(&self, tags: &[&str]) -> bool {
        if tags.is_empty() {
            return false;
        }
        self.records
            .write()
            .await
            .retain(|_, record| !tagged(record.tag.as_deref(), tags));
        true
    }

    async fn update_expire_by_tag(&self, tags: &[&str], lifetime: Option<i64>, bypass_control: bool) -> bool {
        if tags.is_empty() {
            return false;
        }
        let expire = self.expire_time(lifetime, bypass_control);
        for record in self.records.write().await.values_mut() {
            if tagged(record.tag.as_deref(), tags) {
                record.expire = expire;
            }
        }
        true
    }

    async fn get_min_expire_by_tag(&self, tags: &[&str], default: i64) -> i64 {
        let now = now();
        self.records
            .read()
            .await
            .values()
            .filter(|record| tagged(record.tag.as_deref(), tags))
            .filter_map(|record| record.expire)
            .filter(|&expire| expire > now)
            .min()
            .map_or(default, |expire| expire - now)
    }

    async fn save_tag(&self, id: &str, tag: &str) -> bool {
        match self.records.write().await.get_mut(id) {
            Some(record) => {
                record.tag = Some(tag.to_string());
                true
            }
            None => false,
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // load / test / save
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_unknown_id() {
        let cache = MemoryCache::new();
        assert_eq!(cache.test("nope").await, None);
        assert_eq!(cache.load("nope", false, None).await, None);
        assert_eq!(cache.load("nope", true, None).await, None);
    }

    #[tokio::test]
    async fn test_save_infinite() {
        let cache = MemoryCache::new();
        assert!(cache.save("id", "data", None, None, false).await);
        assert_eq!(cache.test("id").await, Some(Expiry::Never));
        assert_eq!(cache.load("id", false, Some(i64::MAX)).await.as_deref(), Some("data"));
    }

    #[tokio::test]
    async fn test_save_with_lifetime() {
        let cache = MemoryCache::new();
        let before = now();
        cache.save("id", "data", Some(10), None, false).await;

        let Some(Expiry::At(ts)) = cache.test("id").await else {
            panic!("expected a finite expiry");
        };
        assert!(ts > before);
        assert_eq!(cache.load("id", false, Some(ts)).await.as_deref(), Some("data"));
        assert_eq!(cache.load("id", false, Some(ts + 1)).await, None);
    }

    #[tokio::test]
    async fn test_save_pre_expired() {
        let cache = MemoryCache::with_policy(LifetimePolicy::new(Some(60), None));
        cache.save("id", "data", Some(-10), None, false).await;
        assert_eq!(cache.test("id").await, None);
        assert_eq!(cache.load("id", false, None).await, None);
        assert_eq!(cache.load("id", true, None).await.as_deref(), Some("data"));
    }

    #[tokio::test]
    async fn test_save_clamped_to_min() {
        let cache = MemoryCache::with_policy(LifetimePolicy::new(Some(600), None));
        let before = now();
        cache.save("id", "data", Some(1), None, false).await;
        let ts = cache.test("id").await.unwrap().timestamp();
        assert!(ts >= before + 600);
    }

    #[tokio::test]
    async fn test_save_replaces() {
        let cache = MemoryCache::new();
        cache.save("id", "one", None, Some("t"), false).await;
        cache.save("id", "two", None, None, false).await;
        assert_eq!(cache.load("id", false, None).await.as_deref(), Some("two"));
        assert_eq!(cache.len().await, 1);
        assert!(cache.remove_by_tag(&["t"]).await);
        assert_eq!(cache.len().await, 1);
    }

    // -------------------------------------------------------------------------
    // remove / clear
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_remove_and_clear() {
        let cache = MemoryCache::new();
        cache.save("a", "1", None, None, false).await;
        cache.save("b", "2", None, None, false).await;
        assert!(cache.remove("a").await);
        assert_eq!(cache.test("a").await, None);
        assert!(cache.clear().await);
        assert!(cache.is_empty().await);
    }

    // -------------------------------------------------------------------------
    // tags
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_remove_by_tag() {
        let cache = MemoryCache::new();
        cache.save("a", "1", None, Some("t"), false).await;
        cache.save("b", "2", None, Some("u"), false).await;
        cache.save("c", "3", None, None, false).await;

        assert!(!cache.remove_by_tag(&[]).await);
        assert_eq!(cache.len().await, 3);

        assert!(cache.remove_by_tag(&["t"]).await);
        assert_eq!(cache.test("a").await, None);
        assert!(cache.test("b").await.is_some());
        assert!(cache.test("c").await.is_some());
    }

    #[tokio::test]
    async fn test_update_expire_by_tag() {
        let cache = MemoryCache::new();
        cache.save("a", "1", None, Some("t"), false).await;
        cache.save("b", "2", None, Some("u"), false).await;

        assert!(cache.update_expire_by_tag(&["t"], Some(-1), false).await);
        assert_eq!(cache.test("a").await, None);
        assert_eq!(cache.test("b").await, Some(Expiry::Never));
    }

    #[tokio::test]
    async fn test_get_min_expire_by_tag() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get_min_expire_by_tag(&["t"], 0).await, 0);

        cache.save("a", "1", None, Some("t"), false).await;
        assert_eq!(cache.get_min_expire_by_tag(&["t"], 0).await, 0);

        cache.save("b", "2", Some(100), Some("t"), false).await;
        cache.save("c", "3", Some(1000), Some("t"), false).await;
        cache.save("d", "4", Some(10), Some("other"), false).await;
        let remaining = cache.get_min_expire_by_tag(&["t"], 0).await;
        assert!((99..=100).contains(&remaining));
    }

    #[tokio::test]
    async fn test_save_tag() {
        let cache = MemoryCache::new();
        assert!(!cache.save_tag("missing", "t").await);
        cache.save("a", "1", None, None, false).await;
        assert!(cache.save_tag("a", "t").await);
        cache.remove_by_tag(&["t"]).await;
        assert!(cache.is_empty().await);
    }
}
