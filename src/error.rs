// src/error.rs
// =============================================================================
// Error type shared by both backends.
//
// The GitHub backend fails with `Query` when the GraphQL endpoint answers
// with something other than usable data. The local backend fails with
// `NotAFile` / `InvalidSha` when the working copy does not look like a
// device-type library. Everything else is plumbing (transport, git, I/O).
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// The GraphQL endpoint returned an error, a non-JSON body or a failing
    /// HTTP status. The message is whatever the server gave us, if anything.
    #[error("{}", .message.as_deref().unwrap_or_default())]
    Query { message: Option<String> },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No text blob returned for sha {sha}")]
    MissingBlob { sha: String },

    #[error("{key} cannot be used as a query alias")]
    InvalidSelectionKey { key: String },

    #[error("{} is not a file", .path.display())]
    NotAFile { path: PathBuf },

    #[error("{sha} is not a valid sha")]
    InvalidSha { sha: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Cannot fast-forward {branch} to origin")]
    NotFastForward { branch: String },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl FetchError {
    pub fn query(message: impl Into<String>) -> Self {
        FetchError::Query {
            message: Some(message.into()),
        }
    }

    /// The message carried by a query error, `None` for every other kind.
    pub fn query_message(&self) -> Option<&str> {
        match self {
            FetchError::Query { message } => message.as_deref(),
            _ => None,
        }
    }

    /// True for the local backend's "bad data in the working copy" failures.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            FetchError::NotAFile { .. } | FetchError::InvalidSha { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_without_message_displays_empty() {
        let err = FetchError::Query { message: None };
        assert_eq!(err.to_string(), "");
        assert_eq!(err.query_message(), None);
    }

    #[test]
    fn test_query_error_displays_message() {
        let err = FetchError::query("Bad credentials");
        assert_eq!(err.to_string(), "Bad credentials");
        assert_eq!(err.query_message(), Some("Bad credentials"));
        assert!(!err.is_value_error());
    }

    #[test]
    fn test_value_errors() {
        let err = FetchError::InvalidSha {
            sha: "deadbeef".to_string(),
        };
        assert!(err.is_value_error());
        assert_eq!(err.to_string(), "deadbeef is not a valid sha");

        let err = FetchError::NotAFile {
            path: PathBuf::from("device-types/Acme/nested"),
        };
        assert!(err.is_value_error());
        assert!(err.to_string().ends_with("nested is not a file"));
    }
}
