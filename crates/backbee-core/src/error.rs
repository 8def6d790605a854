//! Error types for backbee-core

use thiserror::Error;

/// Result type alias for backbee-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in backbee-core
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A caller supplied a malformed value.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument
        message: String,
    },

    /// Configuration could not be used as given.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// A configuration or definition document could not be parsed.
    #[error("Parse error: {message}")]
    Parse {
        /// Parser diagnostic
        message: String,
    },

    /// I/O error while reading configuration or definitions.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new invalid-argument error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Error::Parse {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_argument("empty identifier");
        assert_eq!(err.to_string(), "Invalid argument: empty identifier");
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse("unexpected key `foo`");
        assert_eq!(err.to_string(), "Parse error: unexpected key `foo`");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
