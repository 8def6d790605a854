//! Error types for backbee-cache

use thiserror::Error;

/// Result type alias for backbee-cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in backbee-cache
///
/// Only construction can fail: routine cache operations report storage
/// failures as `false` or a default value.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from backbee-core
    #[error("Core error: {0}")]
    Core(#[from] backbee_core::Error),

    /// No usable database connection could be established.
    #[error("Connection error: {message}")]
    Connection {
        /// What went wrong
        message: String,
    },

    /// An adapter option is invalid.
    #[error("Invalid cache option: {message}")]
    InvalidOption {
        /// What was wrong
        message: String,
    },
}

impl Error {
    /// Creates a new connection error.
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Error::Connection {
            message: message.into(),
        }
    }

    /// Creates a new invalid-option error.
    pub fn invalid_option<S: Into<String>>(message: S) -> Self {
        Error::InvalidOption {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::connection(err.to_string())
    }
}
