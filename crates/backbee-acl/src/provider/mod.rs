//! Permission store backends.
//!
//! # Backends
//!
//! - [`MemoryAclProvider`]: process-local maps, for tests and single-node use
//! - [`SqlAclProvider`]: SQLite tables through `sqlx`

use async_trait::async_trait;

use crate::error::Result;
use crate::identity::ObjectIdentity;
use crate::model::Acl;

mod memory;
mod sql;

pub use memory::MemoryAclProvider;
pub use sql::SqlAclProvider;

/// A store of ACLs that can be created, read, updated and deleted.
///
/// Class-scope entries are shared by every ACL of the same type: updating
/// an ACL writes its class-scope list back for the whole type.
#[async_trait]
pub trait MutableAclProvider: Send + Sync {
    /// Create an empty ACL.
    ///
    /// Fails with [`Error::AclAlreadyExists`](crate::Error::AclAlreadyExists)
    /// if one is stored for `oid`.
    async fn create_acl(&self, oid: &ObjectIdentity) -> Result<Acl>;

    /// Load the ACL of `oid`.
    ///
    /// Fails with [`Error::AclNotFound`](crate::Error::AclNotFound) if none is stored.
    async fn find_acl(&self, oid: &ObjectIdentity) -> Result<Acl>;

    /// Persist the entries of an existing ACL.
    async fn update_acl(&self, acl: &Acl) -> Result<()>;

    /// Delete the ACL of `oid` and its object-scope entries. Missing ACLs are ignored.
    async fn delete_acl(&self, oid: &ObjectIdentity) -> Result<()>;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}
