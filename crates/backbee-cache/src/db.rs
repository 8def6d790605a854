//! SQLite table cache adapter.
//!
//! Records live in a single table:
//!
//! | column    | content                                   |
//! |-----------|-------------------------------------------|
//! | `uid`     | contextual hash of the id                 |
//! | `context` | context the record was saved in           |
//! | `tag`     | contextual hash of the tag, nullable      |
//! | `data`    | stored data                               |
//! | `expire`  | expiry timestamp, `NULL` for never        |
//! | `created` | creation timestamp                        |

use std::fmt::Display;

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};

use crate::adapter::CacheAdapter;
use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::lifetime::{LifetimePolicy, now};
use crate::record::{CacheRecord, Expiry};

type RecordRow = (String, Option<String>, Option<i64>, i64);

/// Cache persisted in a SQLite table.
#[derive(Debug, Clone)]
pub struct DbCache {
    pool: SqlitePool,
    policy: LifetimePolicy,
    context: String,
    table: String,
}

impl DbCache {
    /// Connect using the `dbal` URL of `config`.
    ///
    /// Fails with [`Error::Connection`] when no URL is configured or the
    /// database cannot be opened.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let Some(url) = config.dbal.as_deref() else {
            return Err(Error::connection(
                "neither a connection pool nor a `dbal` URL was provided",
            ));
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(url)
            .await
            .map_err(|e| Error::connection(format!("cannot connect to {url}: {e}")))?;
        Self::from_pool(pool, config).await
    }

    /// Use an existing pool, creating the table when missing.
    pub async fn from_pool(pool: SqlitePool, config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let cache = Self {
            pool,
            policy: config.lifetime_policy(),
            context: config.context.clone(),
            table: config.table.clone(),
        };
        cache.migrate().await?;
        log::debug!(
            "Cache table '{}' ready for context '{}'",
            cache.table,
            cache.context
        );
        Ok(cache)
    }

    async fn migrate(&self) -> Result<()> {
        let table = &self.table;
        let create = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                uid TEXT PRIMARY KEY NOT NULL,
                context TEXT NOT NULL,
                tag TEXT,
                data TEXT NOT NULL,
                expire INTEGER,
                created INTEGER NOT NULL
            )"
        );
        let index = format!("CREATE INDEX IF NOT EXISTS {table}_tag ON {table} (tag)");
        sqlx::query(&create).execute(&self.pool).await?;
        sqlx::query(&index).execute(&self.pool).await?;
        Ok(())
    }

    /// The context ids and tags are hashed with.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The key stored for `id` (or a tag) in this context.
    pub fn contextual_id(&self, id: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.context.as_bytes());
        hasher.update(b"\0");
        hasher.update(id.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    async fn fetch(&self, id: &str) -> Option<CacheRecord> {
        let sql = format!(
            "SELECT data, tag, expire, created FROM {} WHERE uid = ?",
            self.table
        );
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(self.contextual_id(id))
            .fetch_optional(&self.pool)
            .await;
        let (data, tag, expire, created) = logged("load", id, row)??;
        Some(CacheRecord {
            data,
            tag,
            expire,
            created,
        })
    }

    /// Append `tag IN (?, ...)` with every tag hashed.
    fn push_tags(&self, query: &mut QueryBuilder<'_, Sqlite>, tags: &[&str]) {
        query.push(" tag IN (");
        let mut separated = query.separated(", ");
        for tag in tags {
            separated.push_bind(self.contextual_id(tag));
        }
        separated.push_unseparated(")");
    }
}

/// Log a storage failure and turn it into `None`.
fn logged<T, E: Display>(operation: &str, id: &str, result: std::result::Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Cache {operation} failed for '{id}': {e}");
            None
        }
    }
}

#[async_trait]
impl CacheAdapter for DbCache {
    fn policy(&self) -> &LifetimePolicy {
        &self.policy
    }

    async fn load(&self, id: &str, bypass_check: bool, expire: Option<i64>) -> Option<String> {
        let at = expire.unwrap_or_else(now);
        self.fetch(id)
            .await
            .filter(|record| record.loadable(bypass_check, at))
            .map(|record| record.data)
    }

    async fn test(&self, id: &str) -> Option<Expiry> {
        self.fetch(id).await?.validity(now())
    }

    async fn save(
        &self,
        id: &str,
        data: &str,
        lifetime: Option<i64>,
        tag: Option<&str>,
        bypass_control: bool,
    ) -> bool {
        let sql = format!(
            "INSERT INTO {} (uid, context, tag, data, expire, created) VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (uid) DO UPDATE SET
                tag = excluded.tag,
                data = excluded.data,
                expire = excluded.expire,
                created = excluded.created",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(self.contextual_id(id))
            .bind(&self.context)
            .bind(tag.map(|tag| self.contextual_id(tag)))
            .bind(data)
            .bind(self.expire_time(lifetime, bypass_control))
            .bind(now())
            .execute(&self.pool)
            .await;
        logged("save", id, result).is_some()
    }

    async fn remove(&self, id: &str) -> bool {
        let sql = format!("DELETE FROM {} WHERE uid = ?", self.table);
        let result = sqlx::query(&sql)
            .bind(self.contextual_id(id))
            .execute(&self.pool)
            .await;
        logged("remove", id, result).is_some()
    }

    async fn clear(&self) -> bool {
        let sql = format!("DELETE FROM {} WHERE context = ?", self.table);
        let result = sqlx::query(&sql)
            .bind(&self.context)
            .execute(&self.pool)
            .await;
        logged("clear", &self.context, result).is_some()
    }

    async fn remove_by_tag(&self, tags: &[&str]) -> bool {
        if tags.is_empty() {
            return false;
        }
        let mut query = QueryBuilder::<Sqlite>::new(format!("DELETE FROM {} WHERE", self.table));
        self.push_tags(&mut query, tags);
        let result = query.build().execute(&self.pool).await;
        logged("remove_by_tag", &tags.join(","), result).is_some()
    }

    async fn update_expire_by_tag(&self, tags: &[&str], lifetime: Option<i64>, bypass_control: bool) -> bool {
        if tags.is_empty() {
            return false;
        }
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET expire = ", self.table));
        query.push_bind(self.expire_time(lifetime, bypass_control));
        query.push(" WHERE");
        self.push_tags(&mut query, tags);
        let result = query.build().execute(&self.pool).await;
        logged("update_expire_by_tag", &tags.join(","), result).is_some()
    }

    async fn get_min_expire_by_tag(&self, tags: &[&str], default: i64) -> i64 {
        if tags.is_empty() {
            return default;
        }
        let now = now();
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT MIN(expire) FROM {} WHERE expire > ",
            self.table
        ));
        query.push_bind(now);
        query.push(" AND");
        self.push_tags(&mut query, tags);
        let result = query
            .build_query_scalar::<Option<i64>>()
            .fetch_one(&self.pool)
            .await;
        match logged("get_min_expire_by_tag", &tags.join(","), result).flatten() {
            Some(expire) => expire - now,
            None => default,
        }
    }

    async fn save_tag(&self, id: &str, tag: &str) -> bool {
        let sql = format!("UPDATE {} SET tag = ? WHERE uid = ?", self.table);
        let result = sqlx::query(&sql)
            .bind(self.contextual_id(tag))
            .bind(self.contextual_id(id))
            .execute(&self.pool)
            .await;
        logged("save_tag", id, result).is_some_and(|done| done.rows_affected() > 0)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> CacheConfig {
        CacheConfig {
            dbal: Some("sqlite::memory:".to_string()),
            ..CacheConfig::default()
        }
    }

    async fn cache() -> DbCache {
        DbCache::connect(&config()).await.unwrap()
    }

    async fn shared_contexts() -> (DbCache, DbCache) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let mut caches = Vec::new();
        for context in ["front", "back"] {
            let config = CacheConfig {
                context: context.to_string(),
                ..CacheConfig::default()
            };
            caches.push(DbCache::from_pool(pool.clone(), &config).await.unwrap());
        }
        let back = caches.pop().unwrap();
        let front = caches.pop().unwrap();
        (front, back)
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_connect_without_dbal_fails() {
        let err = DbCache::connect(&CacheConfig::default()).await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_database_fails() {
        let config = CacheConfig {
            dbal: Some("sqlite:///nonexistent-dir/sub/cache.db".to_string()),
            ..CacheConfig::default()
        };
        let err = DbCache::connect(&config).await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_table() {
        let config = CacheConfig {
            table: "bad-name".to_string(),
            ..config()
        };
        let err = DbCache::connect(&config).await.unwrap_err();
        assert!(matches!(err, Error::InvalidOption { .. }));
    }

    // -------------------------------------------------------------------------
    // Records
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_save_load_remove() {
        let cache = cache().await;
        assert_eq!(cache.test("id").await, None);
        assert!(cache.save("id", "data", None, None, false).await);
        assert_eq!(cache.test("id").await, Some(Expiry::Never));
        assert_eq!(cache.load("id", false, None).await.as_deref(), Some("data"));

        assert!(cache.save("id", "other", Some(10), None, false).await);
        assert!(matches!(cache.test("id").await, Some(Expiry::At(_))));
        assert_eq!(cache.load("id", false, None).await.as_deref(), Some("other"));

        assert!(cache.remove("id").await);
        assert_eq!(cache.load("id", true, None).await, None);
    }

    #[tokio::test]
    async fn test_pre_expired_record() {
        let cache = cache().await;
        cache.save("id", "data", Some(-10), None, false).await;
        assert_eq!(cache.test("id").await, None);
        assert_eq!(cache.load("id", true, None).await.as_deref(), Some("data"));
    }

    #[tokio::test]
    async fn test_contexts_do_not_collide() {
        let (front, back) = shared_contexts().await;

        front.save("id", "front", None, Some("t"), false).await;
        back.save("id", "back", None, Some("t"), false).await;
        assert_eq!(front.load("id", false, None).await.as_deref(), Some("front"));
        assert_eq!(back.load("id", false, None).await.as_deref(), Some("back"));

        front.remove_by_tag(&["t"]).await;
        assert_eq!(front.test("id").await, None);
        assert_eq!(back.test("id").await, Some(Expiry::Never));
        assert_ne!(front.contextual_id("id"), back.contextual_id("id"));
    }

    #[tokio::test]
    async fn test_clear_only_wipes_own_context() {
        let (front, back) = shared_contexts().await;
        front.save("a", "front", None, None, false).await;
        back.save("b", "back", None, None, false).await;

        assert!(front.clear().await);
        assert_eq!(front.test("a").await, None);
        assert_eq!(back.load("b", false, None).await.as_deref(), Some("back"));
    }

    // -------------------------------------------------------------------------
    // Tags
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_tag_operations() {
        let cache = cache().await;
        cache.save("a", "1", Some(100), Some("t"), false).await;
        cache.save("b", "2", Some(1000), Some("u"), false).await;
        cache.save("c", "3", None, None, false).await;

        let remaining = cache.get_min_expire_by_tag(&["t", "u"], 0).await;
        assert!((99..=100).contains(&remaining));
        assert_eq!(cache.get_min_expire_by_tag(&["none"], 7).await, 7);
        assert_eq!(cache.get_min_expire_by_tag(&[], 7).await, 7);

        assert!(cache.update_expire_by_tag(&["u"], None, false).await);
        assert_eq!(cache.test("b").await, Some(Expiry::Never));

        assert!(!cache.remove_by_tag(&[]).await);
        assert!(cache.remove_by_tag(&["t", "u"]).await);
        assert_eq!(cache.test("a").await, None);
        assert_eq!(cache.test("b").await, None);
        assert_eq!(cache.test("c").await, Some(Expiry::Never));
    }

    #[tokio::test]
    async fn test_save_tag() {
        let cache = cache().await;
        assert!(!cache.save_tag("missing", "t").await);
        cache.save("a", "1", None, None, false).await;
        assert!(cache.save_tag("a", "t").await);
        cache.remove_by_tag(&["t"]).await;
        assert_eq!(cache.test("a").await, None);
    }

    #[tokio::test]
    async fn test_storage_failure_returns_false() {
        let cache = cache().await;
        sqlx::query("DROP TABLE cache")
            .execute(&cache.pool)
            .await
            .unwrap();
        assert!(!cache.save("id", "data", None, None, false).await);
        assert!(!cache.remove("id").await);
        assert!(!cache.clear().await);
        assert_eq!(cache.load("id", true, None).await, None);
        assert_eq!(cache.get_min_expire_by_tag(&["t"], 5).await, 5);
    }
}
