//! In-memory permission store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::MutableAclProvider;
use crate::error::{Error, Result};
use crate::identity::ObjectIdentity;
use crate::model::{Acl, Ace};

#[derive(Debug, Default)]
struct State {
    objects: HashMap<ObjectIdentity, Vec<Ace>>,
    classes: HashMap<String, Vec<Ace>>,
}

impl State {
    fn snapshot(&self, oid: &ObjectIdentity) -> Option<Acl> {
        let object_aces = self.objects.get(oid)?.clone();
        let class_aces = self.classes.get(oid.kind()).cloned().unwrap_or_default();
        Some(Acl::with_aces(oid.clone(), class_aces, object_aces))
    }
}

/// Permission store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryAclProvider {
    state: RwLock<State>,
}

impl MemoryAclProvider {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MutableAclProvider for MemoryAclProvider {
    async fn create_acl(&self, oid: &ObjectIdentity) -> Result<Acl> {
        let mut state = self.state.write().await;
        if state.objects.contains_key(oid) {
            return Err(Error::AclAlreadyExists(oid.clone()));
        }
        state.objects.insert(oid.clone(), Vec::new());
        log::debug!("Created ACL for {oid}");
        state
            .snapshot(oid)
            .ok_or_else(|| Error::AclNotFound(oid.clone()))
    }

    async fn find_acl(&self, oid: &ObjectIdentity) -> Result<Acl> {
        self.state
            .read()
            .await
            .snapshot(oid)
            .ok_or_else(|| Error::AclNotFound(oid.clone()))
    }

    async fn update_acl(&self, acl: &Acl) -> Result<()> {
        let oid = acl.object_identity();
        let mut state = self.state.write().await;
        let Some(object_aces) = state.objects.get_mut(oid) else {
            return Err(Error::AclNotFound(oid.clone()));
        };
        *object_aces = acl.object_aces().to_vec();
        state
            .classes
            .insert(oid.kind().to_string(), acl.class_aces().to_vec());
        Ok(())
    }

    async fn delete_acl(&self, oid: &ObjectIdentity) -> Result<()> {
        self.state.write().await.objects.remove(oid);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
