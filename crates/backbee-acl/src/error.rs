//! Error types for backbee-acl

use thiserror::Error;

use crate::identity::{ObjectIdentity, SecurityIdentity};

/// Result type alias for backbee-acl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in backbee-acl
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from backbee-core
    #[error("Core error: {0}")]
    Core(#[from] backbee_core::Error),

    /// Malformed identity input, or a missing ACE where one was required.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong
        message: String,
    },

    /// A symbolic permission name could not be resolved.
    #[error("Invalid permission: {name}")]
    InvalidPermission {
        /// The offending permission name
        name: String,
    },

    /// A mask value was neither an integer, a name nor a list.
    #[error("Unsupported mask value: {found}")]
    UnsupportedMask {
        /// Description of the value that was supplied
        found: String,
    },

    /// No ACL exists for the object identity.
    #[error("No ACL found for {0}")]
    AclNotFound(ObjectIdentity),

    /// An ACL already exists for the object identity.
    #[error("ACL already exists for {0}")]
    AclAlreadyExists(ObjectIdentity),

    /// The ACL holds no ACE applicable to the requested masks.
    #[error("No applicable ACE found")]
    NoAceFound,

    /// Permission store failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// Creates a new invalid-argument error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// The invalid-argument error raised when `sid` has no ACE on `oid`.
    pub fn ace_not_found(scope: &str, oid: &ObjectIdentity, sid: &SecurityIdentity) -> Self {
        Error::invalid_argument(format!("no {scope} ACE found for {sid} on {oid}"))
    }

    /// Returns whether this error means "nothing stored here" rather than a failure.
    ///
    /// Fallback chains move to the next scope on these errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::AclNotFound(_) | Error::NoAceFound)
    }
}
