//! Centralized error types for webmail-model.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::capability::Operation;

/// All errors produced by the webmail-model library.
#[derive(Error, Debug)]
pub enum MailError {
    /// The message variant does not provide this operation.
    #[error("This message implementation does not support {operation}")]
    Unsupported { operation: Operation },

    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Message file not found: {0}")]
    FileNotFound(PathBuf),

    /// The bytes could not be parsed as an RFC 5322 message.
    #[error("Parse error in '{source_name}': {reason}")]
    Parse { source_name: String, reason: String },

    /// The configuration file exists but is not valid TOML for [`crate::config::Config`].
    #[error("Invalid configuration '{path}': {reason}")]
    Config { path: PathBuf, reason: String },

    /// A credential provider could not produce credentials.
    #[error("Credentials unavailable for '{context}': {reason}")]
    Credentials { context: String, reason: String },

    /// An outgoing message lacks a field a sender requires.
    #[error("Message is not ready to send: {0}")]
    Incomplete(String),
}

/// Convenience alias for `Result<T, MailError>`.
pub type Result<T> = std::result::Result<T, MailError>;

impl MailError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an `Unsupported` variant for `operation`.
    pub fn unsupported(operation: Operation) -> Self {
        Self::Unsupported { operation }
    }

    /// `true` if this error reports a missing capability rather than a failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message_names_operation() {
        let err = MailError::unsupported(Operation::GetTo);
        assert!(err.is_unsupported());
        assert_eq!(
            err.to_string(),
            "This message implementation does not support getTo()"
        );
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let err = MailError::io(
            "/tmp/x.eml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_unsupported());
        assert!(err.to_string().contains("/tmp/x.eml"));
    }
}
