//! # backbee-acl
//!
//! Access control resolution for BackBee.
//!
//! - [`mask`]: permission flags, mask specifications and their resolution
//! - [`identity`]: object and security identities
//! - [`model`]: ACEs, ACLs and granting strategies
//! - [`provider`]: the mutable permission store (memory and SQLite)
//! - [`manager`]: high-level ACE management and effective permissions
//! - [`hierarchy`]: page trees and the content type registry
//! - [`voter`]: the ACL voter and its hierarchical variant

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod identity;
pub mod manager;
pub mod mask;
pub mod model;
pub mod provider;
pub mod voter;

pub use config::AclConfig;
pub use error::{Error, Result};
pub use hierarchy::{ContentTypeRegistry, TreeNode};
pub use identity::{DomainObject, ObjectIdentity, SecurityIdentity, SecurityPrincipal};
pub use manager::{AclManager, Permissions};
pub use mask::{BasicPermissionMap, MaskResolver, MaskSpec, Permission, PermissionMap};
pub use model::{Ace, AceScope, Acl, GrantingStrategy};
pub use provider::{MemoryAclProvider, MutableAclProvider, SqlAclProvider};
pub use voter::{AclVoter, HierarchicalVoter, SecuredObject, Token, Vote};
