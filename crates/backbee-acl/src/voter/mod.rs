//! Access decision voters.
//!
//! - [`AclVoter`]: votes on one object identity from its ACL
//! - [`HierarchicalVoter`]: walks page trees and content type lineages,
//!   delegating each level to an [`AclVoter`]

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identity::{ObjectIdentity, SecurityIdentity};
use crate::mask::PermissionMap;
use crate::provider::MutableAclProvider;

mod hierarchy;

pub use hierarchy::{HierarchicalVoter, SecuredObject};

/// Outcome of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    /// Access is granted.
    Granted,
    /// Access is denied.
    Denied,
    /// The voter has no opinion.
    Abstain,
}

impl Vote {
    /// Returns true if access was granted.
    pub fn is_granted(self) -> bool {
        matches!(self, Vote::Granted)
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Granted => write!(f, "granted"),
            Vote::Denied => write!(f, "denied"),
            Vote::Abstain => write!(f, "abstain"),
        }
    }
}

/// The authenticated principal: its own identity followed by its roles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    sids: Vec<SecurityIdentity>,
}

impl Token {
    /// Create a token for a user.
    pub fn new(user: SecurityIdentity) -> Self {
        Self { sids: vec![user] }
    }

    /// Create a token holding only roles.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Add a role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.sids.push(SecurityIdentity::role(role));
        self
    }

    /// Identities to check, in priority order.
    pub fn security_identities(&self) -> &[SecurityIdentity] {
        &self.sids
    }
}

/// Votes from the ACL of a single object identity.
#[derive(Clone)]
pub struct AclVoter {
    provider: Arc<dyn MutableAclProvider>,
    map: Arc<dyn PermissionMap>,
}

impl AclVoter {
    /// Create a voter.
    pub fn new(provider: Arc<dyn MutableAclProvider>, map: Arc<dyn PermissionMap>) -> Self {
        Self { provider, map }
    }

    /// Vote on `attributes` (permission names) for `oid`.
    ///
    /// Attributes unknown to the permission map are ignored; if none is
    /// known the vote is [`Vote::Abstain`]. A missing ACL denies. The first
    /// attribute the ACL grants wins; otherwise the vote is [`Vote::Denied`].
    pub async fn vote(&self, token: &Token, oid: &ObjectIdentity, attributes: &[&str]) -> Result<Vote> {
        let mut result = Vote::Abstain;
        let sids = token.security_identities();

        for attribute in attributes {
            let Some(masks) = self.map.masks(attribute, oid) else {
                continue;
            };
            result = Vote::Denied;

            let acl = match self.provider.find_acl(oid).await {
                Ok(acl) => acl,
                Err(Error::AclNotFound(_)) => {
                    log::debug!("No ACL for {oid}, denying {attribute}");
                    return Ok(Vote::Denied);
                }
                Err(e) => return Err(e),
            };

            match acl.is_granted(&masks, sids) {
                Ok(true) => {
                    log::debug!("Granted {attribute} on {oid}");
                    return Ok(Vote::Granted);
                }
                Ok(false) | Err(Error::NoAceFound) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(result)
    }
}

impl fmt::Debug for AclVoter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AclVoter")
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}
