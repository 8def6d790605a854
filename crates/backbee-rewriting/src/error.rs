//! Error types for backbee-rewriting

use thiserror::Error;

/// Result type alias for backbee-rewriting operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in backbee-rewriting
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from backbee-core
    #[error("Core error: {0}")]
    Core(#[from] backbee_core::Error),

    /// No rewriting scheme applies to the page and it has no URL yet.
    #[error("No rewriting scheme found for page {uid}")]
    MissingScheme {
        /// Uid of the page
        uid: String,
    },

    /// Every numeric suffix for a taken URL is already in use.
    #[error("No free suffix left for URL {url}")]
    SuffixExhausted {
        /// The taken URL
        url: String,
    },

    /// A uniqueness pattern could not be compiled.
    #[error("Invalid URL pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The page repository failed.
    #[error("Repository error: {message}")]
    Repository {
        /// What went wrong
        message: String,
    },
}

impl Error {
    /// Creates a new missing-scheme error.
    pub fn missing_scheme<S: Into<String>>(uid: S) -> Self {
        Error::MissingScheme { uid: uid.into() }
    }

    /// Creates a new suffix-exhausted error.
    pub fn suffix_exhausted<S: Into<String>>(url: S) -> Self {
        Error::SuffixExhausted { url: url.into() }
    }

    /// Creates a new repository error.
    pub fn repository<S: Into<String>>(message: S) -> Self {
        Error::Repository {
            message: message.into(),
        }
    }
}
