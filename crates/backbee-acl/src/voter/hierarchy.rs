//! Hierarchical voter for pages, nested nodes, contents and bundles.

use std::sync::Arc;

use super::{AclVoter, Token, Vote};
use crate::error::Result;
use crate::hierarchy::{ContentTypeRegistry, TreeNode};
use crate::identity::ObjectIdentity;

/// Identifier of the placeholder instance voted on for ancestor content types.
const ANY_INSTANCE_IDENTIFIER: &str = "*";

/// An object access is requested on, with the hierarchy it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecuredObject {
    /// A CMS page and its ancestors up to the root page.
    Page(TreeNode),
    /// Any other nested node and its ancestors.
    Node(TreeNode),
    /// A content instance. Uncategorized contents are always accessible.
    Content {
        /// The content identity; its type is looked up in the type registry.
        identity: ObjectIdentity,
        /// Declared category of the content, if any.
        category: Option<String>,
    },
    /// A bundle, voted on without any hierarchy.
    Bundle(ObjectIdentity),
    /// Anything else.
    Object(ObjectIdentity),
}

impl SecuredObject {
    /// Describe a content instance, taking its category from `types`.
    pub fn content(identity: ObjectIdentity, types: &ContentTypeRegistry) -> Self {
        let category = types.category_of(identity.kind()).map(str::to_string);
        Self::Content { identity, category }
    }
}

/// Votes by walking object hierarchies until a level decides.
#[derive(Debug, Clone)]
pub struct HierarchicalVoter {
    voter: AclVoter,
    types: Arc<ContentTypeRegistry>,
}

impl HierarchicalVoter {
    /// Create a voter over an [`AclVoter`] and the content type registry.
    pub fn new(voter: AclVoter, types: Arc<ContentTypeRegistry>) -> Self {
        Self { voter, types }
    }

    /// Vote on `attributes` for `object`.
    pub async fn vote(&self, token: &Token, object: &SecuredObject, attributes: &[&str]) -> Result<Vote> {
        let vote = match object {
            SecuredObject::Page(page) => self.vote_for_page(token, page, attributes).await?,
            SecuredObject::Node(node) => self.vote_for_page(token, node, attributes).await?,
            SecuredObject::Content { identity, category } => {
                self.vote_for_class_content(token, identity, category.as_deref(), attributes)
                    .await?
            }
            SecuredObject::Bundle(bundle) => self.voter.vote(token, bundle, attributes).await?,
            SecuredObject::Object(oid) => self.vote_for_object(token, oid, attributes).await?,
        };
        log::debug!("Vote on {object:?} for {attributes:?}: {vote}");
        Ok(vote)
    }

    /// Object-scope vote, falling back to class scope when it denies.
    ///
    /// Granted and abstaining object-scope votes are final.
    pub async fn vote_for_object(
        &self,
        token: &Token,
        oid: &ObjectIdentity,
        attributes: &[&str],
    ) -> Result<Vote> {
        let result = self.voter.vote(token, oid, attributes).await?;
        if result != Vote::Denied {
            return Ok(result);
        }
        self.voter
            .vote(token, &oid.to_class_scope(), attributes)
            .await
    }

    /// Vote on a node, then on each ancestor while the vote is denied.
    ///
    /// The root's vote is final.
    pub async fn vote_for_page(&self, token: &Token, page: &TreeNode, attributes: &[&str]) -> Result<Vote> {
        let mut result = Vote::Abstain;
        for node in page.chain() {
            result = self.vote_for_object(token, node, attributes).await?;
            if result != Vote::Denied {
                break;
            }
        }
        Ok(result)
    }

    /// Vote on a content, then on its ancestor types while the vote is denied.
    ///
    /// Uncategorized contents (and ancestor types) are granted. The walk ends
    /// with a class-scope vote on the abstract base type.
    pub async fn vote_for_class_content(
        &self,
        token: &Token,
        identity: &ObjectIdentity,
        category: Option<&str>,
        attributes: &[&str],
    ) -> Result<Vote> {
        if category.is_none() {
            return Ok(Vote::Granted);
        }

        let mut result = self.vote_for_object(token, identity, attributes).await?;
        for kind in self.types.lineage(identity.kind()) {
            if result != Vote::Denied {
                break;
            }
            if kind == self.types.base() {
                let base = ObjectIdentity::class_scope(kind)?;
                return self.voter.vote(token, &base, attributes).await;
            }
            if self.types.category_of(&kind).is_none() {
                return Ok(Vote::Granted);
            }
            let instance = ObjectIdentity::new(ANY_INSTANCE_IDENTIFIER, kind)?;
            result = self.vote_for_object(token, &instance, attributes).await?;
        }
        Ok(result)
    }
}
