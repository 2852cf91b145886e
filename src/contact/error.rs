//! Error taxonomy for the submission pipeline
//!
//! Only [`ValidationError`] ever reaches a client with detail. Storage and
//! mail errors are logged by the handler and otherwise dropped.

use std::path::PathBuf;
use thiserror::Error;

/// Rejections caused by the submitted payload itself
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email format")]
    InvalidEmail,
}

/// Backup store failures
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to create backup directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode submission: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to parse {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Notification failures
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("notifier task failed: {0}")]
    Task(String),
}

/// Top-level outcome of a submission that did not succeed
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages() {
        assert_eq!(
            ValidationError::MissingField("subject").to_string(),
            "Missing required field: subject"
        );
        assert_eq!(
            ValidationError::InvalidEmail.to_string(),
            "Invalid email format"
        );
        let wrapped = SubmitError::from(ValidationError::InvalidEmail);
        assert_eq!(wrapped.to_string(), "Invalid email format");
    }
}
