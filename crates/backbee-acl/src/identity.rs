//! Object and security identities.
//!
//! An [`ObjectIdentity`] addresses an ACL: either one instance of a type, or
//! the whole type when its identifier is [`CLASS_SCOPE_IDENTIFIER`]. A
//! [`SecurityIdentity`] names the principal an ACE applies to.
//!
//! Domain values enter the ACL layer through the [`DomainObject`] and
//! [`SecurityPrincipal`] traits, which resolve them into these canonical
//! identities once, at the API boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier used by class-scope object identities.
pub const CLASS_SCOPE_IDENTIFIER: &str = "all";

/// An `(identifier, type)` pair addressing an ACL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectIdentity {
    identifier: String,
    #[serde(rename = "type")]
    kind: String,
}

impl ObjectIdentity {
    /// Create an object identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if either part is blank.
    pub fn new(identifier: impl Into<String>, kind: impl Into<String>) -> Result<Self> {
        let identifier = identifier.into();
        let kind = kind.into();
        if identifier.trim().is_empty() {
            return Err(Error::invalid_argument(format!(
                "object identity of type '{kind}' has an empty identifier"
            )));
        }
        if kind.trim().is_empty() {
            return Err(Error::invalid_argument(format!(
                "object identity '{identifier}' has an empty type"
            )));
        }
        Ok(Self { identifier, kind })
    }

    /// Create the class-scope identity of a type.
    pub fn class_scope(kind: impl Into<String>) -> Result<Self> {
        Self::new(CLASS_SCOPE_IDENTIFIER, kind)
    }

    /// The instance identifier, or `"all"` for class scope.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The domain type name.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether this identity addresses a whole type.
    pub fn is_class_scope(&self) -> bool {
        self.identifier == CLASS_SCOPE_IDENTIFIER
    }

    /// The class-scope identity of this identity's type.
    pub fn to_class_scope(&self) -> Self {
        Self {
            identifier: CLASS_SCOPE_IDENTIFIER.to_string(),
            kind: self.kind.clone(),
        }
    }

    /// The same identifier re-addressed to another type.
    pub fn with_kind(&self, kind: impl Into<String>) -> Result<Self> {
        Self::new(self.identifier.clone(), kind)
    }
}

impl fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.identifier, self.kind)
    }
}

/// A principal an ACE can be granted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityIdentity {
    /// A user account, qualified by its account type.
    User {
        /// Account type name (e.g. `BackBee\Security\User`)
        class: String,
        /// Login name
        username: String,
    },
    /// A role or group.
    Role(String),
}

impl SecurityIdentity {
    /// Create a user security identity.
    pub fn user(class: impl Into<String>, username: impl Into<String>) -> Self {
        Self::User {
            class: class.into(),
            username: username.into(),
        }
    }

    /// Create a role security identity.
    pub fn role(name: impl Into<String>) -> Self {
        Self::Role(name.into())
    }
}

impl fmt::Display for SecurityIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { class, username } => write!(f, "user:{class}:{username}"),
            Self::Role(name) => write!(f, "role:{name}"),
        }
    }
}

impl FromStr for SecurityIdentity {
    type Err = Error;

    /// Parse `user:<class>:<username>` or `role:<name>`.
    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::invalid_argument(format!("malformed security identity '{s}'"));
        match s.split_once(':') {
            Some(("role", name)) if !name.is_empty() => Ok(Self::role(name)),
            Some(("user", rest)) => match rest.split_once(':') {
                Some((class, username)) if !class.is_empty() && !username.is_empty() => {
                    Ok(Self::user(class, username))
                }
                _ => Err(malformed()),
            },
            _ => Err(malformed()),
        }
    }
}

/// A domain value that can be addressed by the ACL layer.
pub trait DomainObject {
    /// The object identity of this value.
    fn object_identity(&self) -> ObjectIdentity;
}

impl DomainObject for ObjectIdentity {
    fn object_identity(&self) -> ObjectIdentity {
        self.clone()
    }
}

/// A domain value that can hold ACEs (a user, a group).
pub trait SecurityPrincipal {
    /// The security identity of this principal.
    fn security_identity(&self) -> SecurityIdentity;
}

impl SecurityPrincipal for SecurityIdentity {
    fn security_identity(&self) -> SecurityIdentity {
        self.clone()
    }
}
