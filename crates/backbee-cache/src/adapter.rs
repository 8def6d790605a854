//! The cache adapter contract.

use async_trait::async_trait;

use crate::lifetime::LifetimePolicy;
use crate::record::Expiry;

/// A tag-aware cache backend.
///
/// Lifetimes are in seconds and timestamps are Unix seconds. Operations never
/// fail: storage problems are logged and reported as `false`, `None` or the
/// supplied default.
#[async_trait]
pub trait CacheAdapter: Send + Sync {
    /// Lifetime bounds applied on save.
    fn policy(&self) -> &LifetimePolicy;

    /// Return the data stored under `id`.
    ///
    /// Expired data is returned only when `bypass_check` is set. `expire`
    /// probes validity at another time than now: the data is returned when
    /// the record never expires or `expire` is not past its expiry.
    async fn load(&self, id: &str, bypass_check: bool, expire: Option<i64>) -> Option<String>;

    /// The expiry of a valid record, or `None` when missing or expired.
    async fn test(&self, id: &str) -> Option<Expiry>;

    /// Store `data` under `id`, replacing any previous record.
    ///
    /// The lifetime is clamped by [`policy`](Self::policy) unless
    /// `bypass_control` is set.
    async fn save(
        &self,
        id: &str,
        data: &str,
        lifetime: Option<i64>,
        tag: Option<&str>,
        bypass_control: bool,
    ) -> bool;

    /// Remove the record stored under `id`.
    async fn remove(&self, id: &str) -> bool;

    /// Remove every record of this cache.
    ///
    /// Caches sharing storage under another context keep their records.
    async fn clear(&self) -> bool;

    /// Remove every record carrying one of `tags`. No tags is a no-op returning `false`.
    async fn remove_by_tag(&self, tags: &[&str]) -> bool;

    /// Give every record carrying one of `tags` a new lifetime.
    async fn update_expire_by_tag(&self, tags: &[&str], lifetime: Option<i64>, bypass_control: bool)
    -> bool;

    /// Smallest remaining lifetime, in seconds, among valid records carrying
    /// one of `tags` and a finite expiry; `default` when there are none.
    async fn get_min_expire_by_tag(&self, tags: &[&str], default: i64) -> i64;

    /// Attach `tag` to the existing record `id`.
    async fn save_tag(&self, id: &str, tag: &str) -> bool;

    /// Backend name, for logging.
    fn name(&self) -> &str;

    /// Absolute expiry for a record saved now, `None` meaning never.
    fn expire_time(&self, lifetime: Option<i64>, bypass_control: bool) -> Option<i64> {
        self.policy().expire_time(lifetime, bypass_control)
    }
}
