//! SQLite-backed permission store.
//!
//! Two tables hold the data:
//!
//! - `acl_object_identities`: one row per ACL
//! - `acl_entries`: ACEs; class-scope rows use an empty identifier and are
//!   shared by every ACL of their type

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use super::MutableAclProvider;
use crate::error::{Error, Result};
use crate::identity::{ObjectIdentity, SecurityIdentity};
use crate::model::{Ace, AceScope, Acl, GrantingStrategy};

const CREATE_IDENTITIES_TABLE: &str = "CREATE TABLE IF NOT EXISTS acl_object_identities (
    object_type TEXT NOT NULL,
    object_identifier TEXT NOT NULL,
    PRIMARY KEY (object_type, object_identifier)
)";

const CREATE_ENTRIES_TABLE: &str = "CREATE TABLE IF NOT EXISTS acl_entries (
    scope TEXT NOT NULL,
    object_type TEXT NOT NULL,
    object_identifier TEXT NOT NULL,
    ace_order INTEGER NOT NULL,
    security_identity TEXT NOT NULL,
    mask INTEGER NOT NULL,
    granting INTEGER NOT NULL,
    granting_strategy TEXT NOT NULL
)";

const CREATE_ENTRIES_INDEX: &str = "CREATE INDEX IF NOT EXISTS acl_entries_lookup
    ON acl_entries (scope, object_type, object_identifier)";

type AceRow = (String, i64, bool, String);

/// Permission store persisted in SQLite.
#[derive(Debug, Clone)]
pub struct SqlAclProvider {
    pool: SqlitePool,
}

impl SqlAclProvider {
    /// Wrap an existing pool. Call [`migrate`](Self::migrate) before use.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `url` and create the tables.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(url)
            .await?;
        let provider = Self::from_pool(pool);
        provider.migrate().await?;
        Ok(provider)
    }

    /// Create the tables if they do not exist.
    pub async fn migrate(&self) -> Result<()> {
        for statement in [CREATE_IDENTITIES_TABLE, CREATE_ENTRIES_TABLE, CREATE_ENTRIES_INDEX] {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn exists(&self, oid: &ObjectIdentity) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM acl_object_identities WHERE object_type = ? AND object_identifier = ?",
        )
        .bind(oid.kind())
        .bind(oid.identifier())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn load_aces(&self, scope: AceScope, kind: &str, identifier: &str) -> Result<Vec<Ace>> {
        let rows: Vec<AceRow> = sqlx::query_as(
            "SELECT security_identity, mask, granting, granting_strategy FROM acl_entries
             WHERE scope = ? AND object_type = ? AND object_identifier = ?
             ORDER BY ace_order",
        )
        .bind(scope.as_str())
        .bind(kind)
        .bind(identifier)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_ace).collect()
    }
}

fn row_to_ace((sid, mask, granting, strategy): AceRow) -> Result<Ace> {
    let mask = u32::try_from(mask)
        .map_err(|_| Error::invalid_argument(format!("stored mask {mask} is out of range")))?;
    Ok(Ace {
        sid: sid.parse::<SecurityIdentity>()?,
        mask,
        strategy: strategy.parse::<GrantingStrategy>()?,
        granting,
    })
}

fn scope_identifier(scope: AceScope, oid: &ObjectIdentity) -> &str {
    match scope {
        AceScope::Class => "",
        AceScope::Object => oid.identifier(),
    }
}

#[async_trait]
impl MutableAclProvider for SqlAclProvider {
    async fn create_acl(&self, oid: &ObjectIdentity) -> Result<Acl> {
        if self.exists(oid).await? {
            return Err(Error::AclAlreadyExists(oid.clone()));
        }
        sqlx::query(
            "INSERT INTO acl_object_identities (object_type, object_identifier) VALUES (?, ?)",
        )
        .bind(oid.kind())
        .bind(oid.identifier())
        .execute(&self.pool)
        .await?;
        log::debug!("Created ACL for {oid}");
        self.find_acl(oid).await
    }

    async fn find_acl(&self, oid: &ObjectIdentity) -> Result<Acl> {
        if !self.exists(oid).await? {
            return Err(Error::AclNotFound(oid.clone()));
        }
        let class_aces = self.load_aces(AceScope::Class, oid.kind(), "").await?;
        let object_aces = self
            .load_aces(AceScope::Object, oid.kind(), oid.identifier())
            .await?;
        Ok(Acl::with_aces(oid.clone(), class_aces, object_aces))
    }

    async fn update_acl(&self, acl: &Acl) -> Result<()> {
        let oid = acl.object_identity();
        if !self.exists(oid).await? {
            return Err(Error::AclNotFound(oid.clone()));
        }

        let mut tx = self.pool.begin().await?;
        for scope in [AceScope::Class, AceScope::Object] {
            let identifier = scope_identifier(scope, oid);
            sqlx::query(
                "DELETE FROM acl_entries WHERE scope = ? AND object_type = ? AND object_identifier = ?",
            )
            .bind(scope.as_str())
            .bind(oid.kind())
            .bind(identifier)
            .execute(&mut *tx)
            .await?;

            for (order, ace) in acl.aces(scope).iter().enumerate() {
                sqlx::query(
                    "INSERT INTO acl_entries (scope, object_type, object_identifier, ace_order,
                        security_identity, mask, granting, granting_strategy)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(scope.as_str())
                .bind(oid.kind())
                .bind(identifier)
                .bind(order as i64)
                .bind(ace.sid.to_string())
                .bind(i64::from(ace.mask))
                .bind(ace.granting)
                .bind(ace.strategy.as_str())
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_acl(&self, oid: &ObjectIdentity) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "DELETE FROM acl_entries WHERE scope = ? AND object_type = ? AND object_identifier = ?",
        )
        .bind(AceScope::Object.as_str())
        .bind(oid.kind())
        .bind(oid.identifier())
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "DELETE FROM acl_object_identities WHERE object_type = ? AND object_identifier = ?",
        )
        .bind(oid.kind())
        .bind(oid.identifier())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
