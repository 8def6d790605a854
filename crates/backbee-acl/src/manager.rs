//! ACL manager: entry CRUD and effective permission lookup.
//!
//! The manager works on canonical identities: domain objects and principals
//! are converted through [`DomainObject`] and [`SecurityPrincipal`] when a
//! call enters. Class-scope operations always address the class-scope
//! identity (`"all"`) of the object's type.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::AclConfig;
use crate::error::{Error, Result};
use crate::hierarchy::{ContentTypeRegistry, TreeNode};
use crate::identity::{DomainObject, ObjectIdentity, SecurityIdentity, SecurityPrincipal};
use crate::mask::{access_granted, permission_codes, MaskResolver, MaskSpec};
use crate::model::{Ace, AceScope, Acl, GrantingStrategy};
use crate::provider::MutableAclProvider;

/// Effective permissions: permission name → 0 or 1.
pub type Permissions = BTreeMap<String, u8>;

/// Manages ACEs on top of a [`MutableAclProvider`].
#[derive(Clone)]
pub struct AclManager {
    provider: Arc<dyn MutableAclProvider>,
    resolver: MaskResolver,
    types: Arc<ContentTypeRegistry>,
    config: AclConfig,
}

impl AclManager {
    /// Create a manager with the default permission map and an empty type registry.
    pub fn new(provider: Arc<dyn MutableAclProvider>) -> Self {
        let config = AclConfig::default();
        let types = Arc::new(ContentTypeRegistry::new(config.content_base_type.clone()));
        Self {
            provider,
            resolver: MaskResolver::default(),
            types,
            config,
        }
    }

    /// Use a specific mask resolver.
    pub fn with_resolver(mut self, resolver: MaskResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Use a content type registry for type-hierarchy fallbacks.
    pub fn with_types(mut self, types: Arc<ContentTypeRegistry>) -> Self {
        self.types = types;
        self
    }

    /// Apply configuration.
    pub fn with_config(mut self, config: AclConfig) -> Self {
        self.config = config;
        self
    }

    /// The mask resolver in use.
    pub fn resolver(&self) -> &MaskResolver {
        &self.resolver
    }

    /// Every named permission bit.
    pub fn permission_codes(&self) -> BTreeMap<String, u32> {
        permission_codes()
    }

    /// Fetch the ACL of `object`, creating it when missing.
    pub async fn get_acl<O: DomainObject + ?Sized>(&self, object: &O) -> Result<Acl> {
        let oid = object.object_identity();
        match self.provider.create_acl(&oid).await {
            Err(Error::AclAlreadyExists(_)) => self.provider.find_acl(&oid).await,
            other => other,
        }
    }

    // ------------------------------------------------------------------------
    // Entry mutation
    // ------------------------------------------------------------------------

    /// Update the object-scope ACE of `sid`, inserting it when missing.
    pub async fn insert_or_update_object_ace<O, S>(
        &self,
        object: &O,
        sid: &S,
        mask: impl Into<MaskSpec>,
        strategy: Option<GrantingStrategy>,
    ) -> Result<()>
    where
        O: DomainObject + ?Sized,
        S: SecurityPrincipal + ?Sized,
    {
        let oid = object.object_identity();
        self.upsert_ace(AceScope::Object, oid, sid.security_identity(), mask.into(), strategy, true)
            .await
    }

    /// Update the class-scope ACE of `sid`, inserting it when missing.
    pub async fn insert_or_update_class_ace<O, S>(
        &self,
        object: &O,
        sid: &S,
        mask: impl Into<MaskSpec>,
        strategy: Option<GrantingStrategy>,
    ) -> Result<()>
    where
        O: DomainObject + ?Sized,
        S: SecurityPrincipal + ?Sized,
    {
        let oid = object.object_identity().to_class_scope();
        self.upsert_ace(AceScope::Class, oid, sid.security_identity(), mask.into(), strategy, true)
            .await
    }

    /// Update the existing object-scope ACE of `sid`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `sid` has no such ACE.
    pub async fn update_object_ace<O, S>(
        &self,
        object: &O,
        sid: &S,
        mask: impl Into<MaskSpec>,
        strategy: Option<GrantingStrategy>,
    ) -> Result<()>
    where
        O: DomainObject + ?Sized,
        S: SecurityPrincipal + ?Sized,
    {
        let oid = object.object_identity();
        self.upsert_ace(AceScope::Object, oid, sid.security_identity(), mask.into(), strategy, false)
            .await
    }

    /// Update the existing class-scope ACE of `sid`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `sid` has no such ACE.
    pub async fn update_class_ace<O, S>(
        &self,
        object: &O,
        sid: &S,
        mask: impl Into<MaskSpec>,
        strategy: Option<GrantingStrategy>,
    ) -> Result<()>
    where
        O: DomainObject + ?Sized,
        S: SecurityPrincipal + ?Sized,
    {
        let oid = object.object_identity().to_class_scope();
        self.upsert_ace(AceScope::Class, oid, sid.security_identity(), mask.into(), strategy, false)
            .await
    }

    /// Delete the object-scope ACE of `sid`.
    pub async fn delete_object_ace<O, S>(&self, object: &O, sid: &S) -> Result<()>
    where
        O: DomainObject + ?Sized,
        S: SecurityPrincipal + ?Sized,
    {
        self.delete_ace(AceScope::Object, object.object_identity(), sid.security_identity())
            .await
    }

    /// Delete the class-scope ACE of `sid`.
    pub async fn delete_class_ace<O, S>(&self, object: &O, sid: &S) -> Result<()>
    where
        O: DomainObject + ?Sized,
        S: SecurityPrincipal + ?Sized,
    {
        let oid = object.object_identity().to_class_scope();
        self.delete_ace(AceScope::Class, oid, sid.security_identity())
            .await
    }

    async fn upsert_ace(
        &self,
        scope: AceScope,
        oid: ObjectIdentity,
        sid: SecurityIdentity,
        mask: MaskSpec,
        strategy: Option<GrantingStrategy>,
        insert_if_missing: bool,
    ) -> Result<()> {
        let mask = self.resolver.resolve(&mask, &oid)?;
        let mut acl = self.get_acl(&oid).await?;

        let existing = acl.find_ace(scope, &sid).map(|(index, _)| index);
        match existing {
            Some(index) => acl.update_ace(scope, index, mask, strategy)?,
            None if insert_if_missing => {
                let ace = Ace::granting(sid, mask, strategy.unwrap_or_default());
                acl.insert_ace(scope, 0, ace)?;
            }
            None => return Err(Error::ace_not_found(scope.as_str(), &oid, &sid)),
        }

        log::debug!("Stored {scope} ACE mask {mask} on {oid}");
        self.provider.update_acl(&acl).await
    }

    async fn delete_ace(
        &self,
        scope: AceScope,
        oid: ObjectIdentity,
        sid: SecurityIdentity,
    ) -> Result<()> {
        let mut acl = self.get_acl(&oid).await?;
        let Some((index, _)) = acl.find_ace(scope, &sid) else {
            return Err(Error::ace_not_found(scope.as_str(), &oid, &sid));
        };
        acl.delete_ace(scope, index)?;
        self.provider.update_acl(&acl).await
    }

    // ------------------------------------------------------------------------
    // Entry lookup
    // ------------------------------------------------------------------------

    /// The object-scope ACE of `sid`.
    ///
    /// Does not create the ACL: a missing ACL surfaces as
    /// [`Error::AclNotFound`], a missing entry as [`Error::InvalidArgument`].
    pub async fn get_object_ace<O, S>(&self, object: &O, sid: &S) -> Result<Ace>
    where
        O: DomainObject + ?Sized,
        S: SecurityPrincipal + ?Sized,
    {
        self.find_ace(AceScope::Object, object.object_identity(), sid.security_identity())
            .await
    }

    /// The class-scope ACE of `sid` for the object's type.
    pub async fn get_class_ace<O, S>(&self, object: &O, sid: &S) -> Result<Ace>
    where
        O: DomainObject + ?Sized,
        S: SecurityPrincipal + ?Sized,
    {
        let oid = object.object_identity().to_class_scope();
        self.find_ace(AceScope::Class, oid, sid.security_identity())
            .await
    }

    async fn find_ace(
        &self,
        scope: AceScope,
        oid: ObjectIdentity,
        sid: SecurityIdentity,
    ) -> Result<Ace> {
        let acl = self.provider.find_acl(&oid).await?;
        acl.find_ace(scope, &sid)
            .map(|(_, ace)| ace.clone())
            .ok_or_else(|| Error::ace_not_found(scope.as_str(), &oid, &sid))
    }

    /// Returns `Ok(None)` when no ACL or no entry exists at this level.
    ///
    /// Store and decoding failures propagate.
    async fn try_ace(
        &self,
        scope: AceScope,
        oid: &ObjectIdentity,
        sid: &SecurityIdentity,
    ) -> Result<Option<Ace>> {
        let oid = match scope {
            AceScope::Class => oid.to_class_scope(),
            AceScope::Object => oid.clone(),
        };
        let acl = match self.provider.find_acl(&oid).await {
            Ok(acl) => acl,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(acl.find_ace(scope, sid).map(|(_, ace)| ace.clone()))
    }

    // ------------------------------------------------------------------------
    // Effective permissions
    // ------------------------------------------------------------------------

    /// Effective permissions of `sid` on `object`.
    ///
    /// Tries the object-scope ACE, then the class-scope ACE (unless the type
    /// is excluded), then repeats both for each ancestor type of the object.
    /// Returns an empty map when nothing applies.
    pub async fn get_permissions<O, S>(&self, object: &O, sid: &S) -> Result<Permissions>
    where
        O: DomainObject + ?Sized,
        S: SecurityPrincipal + ?Sized,
    {
        let oid = object.object_identity();
        let sid = sid.security_identity();

        let mut levels = vec![oid.clone()];
        for kind in self.types.lineage(oid.kind()) {
            levels.push(oid.with_kind(kind)?);
        }

        for level in &levels {
            if let Some(ace) = self.try_ace(AceScope::Object, level, &sid).await? {
                return Ok(access_granted(ace.mask));
            }
            if self.config.is_excluded(level.kind()) {
                continue;
            }
            if let Some(ace) = self.try_ace(AceScope::Class, level, &sid).await? {
                return Ok(access_granted(ace.mask));
            }
        }

        log::debug!("No ACE for {sid} on {oid} or its ancestor types");
        Ok(Permissions::new())
    }

    /// Effective permissions of `sid` on a page.
    ///
    /// Tries the object-scope ACE of the page and of each ancestor up to the
    /// root, then the class-scope ACE of the root.
    pub async fn get_permissions_by_page<S>(&self, page: &TreeNode, sid: &S) -> Result<Permissions>
    where
        S: SecurityPrincipal + ?Sized,
    {
        let sid = sid.security_identity();
        for node in page.chain() {
            if let Some(ace) = self.try_ace(AceScope::Object, node, &sid).await? {
                return Ok(access_granted(ace.mask));
            }
        }
        match self.try_ace(AceScope::Class, page.tree_root(), &sid).await? {
            Some(ace) => Ok(access_granted(ace.mask)),
            None => Ok(Permissions::new()),
        }
    }
}

impl std::fmt::Debug for AclManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclManager")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish()
    }
}
