//! Error types for comment-kit.
//!
//! # Error Hierarchy
//!
//! - [`Error`](enum@Error) — Main error type, returned by every operation
//!   - [`ValidationError`] — A builder was misused; raised synchronously before
//!     any network activity
//!   - [`TransportError`] — The exchange failed; always delivered through the
//!     result channel (awaited future or callback)
//!
//! # Error Handling Example
//!
//! ```rust,no_run
//! use comment_kit::*;
//!
//! # async fn example(comments: Comments) -> Result<(), Error> {
//! match comments.find_all(false).on("article-7")?.fire()?.await {
//!     Ok(list) => println!("{list}"),
//!     Err(Error::Transport(TransportError::Status { status, body })) => {
//!         println!("server said {status}: {body}");
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// A fluent chain was built or dispatched in an invalid state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("username must be specified and non-empty")]
    EmptyUsername,

    #[error("cannot do recursive search by username. See API examples.")]
    RecursiveByUsername,

    #[error("cannot do recursive search by assoc only. See API examples.")]
    RecursiveByAssociation,

    #[error("parameters required to conduct .find/.findAll operations")]
    UnresolvedFind,

    #[error(".by(username) is required")]
    UsernameRequired,

    #[error("body is required")]
    BodyRequired,

    #[error(".of(postId) is required")]
    PostIdRequired,

    #[error(".by(username) or .on(assoc) is required")]
    UsernameOrAssociationRequired,

    #[error(".on(assoc) is required")]
    AssociationRequired,

    #[error("limit must be a positive integer")]
    ZeroLimit,
}

/// The HTTP exchange did not produce a successful response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. Displays as the raw response body.
    #[error("{body}")]
    Status { status: u16, body: String },

    #[error("exchange ended without delivering a result")]
    Dropped,
}

impl TransportError {
    /// Create a status error from a response.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        TransportError::Status {
            status,
            body: body.into(),
        }
    }

    /// The HTTP status code, if the server answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
            TransportError::Dropped => None,
        }
    }
}

/// Main error type for comment-kit operations.
#[derive(Debug, Error)]
pub enum Error {
    // ─── Configuration ───
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ─── Builder ───
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // ─── Exchange ───
    #[error(transparent)]
    Transport(#[from] TransportError),

    // ─── Serialization ───
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if this error is a builder validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Returns true if this error is a configuration failure.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Returns the validation failure, if any.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::RecursiveByUsername.to_string(),
            "cannot do recursive search by username. See API examples."
        );
        assert_eq!(
            ValidationError::UnresolvedFind.to_string(),
            "parameters required to conduct .find/.findAll operations"
        );
        assert_eq!(
            ValidationError::UsernameOrAssociationRequired.to_string(),
            ".by(username) or .on(assoc) is required"
        );
    }

    #[test]
    fn test_status_error_displays_raw_body() {
        let err = TransportError::status(404, "not found");
        assert_eq!(err.to_string(), "not found");
        assert_eq!(err.status_code(), Some(404));

        let err: Error = err.into();
        assert_eq!(err.to_string(), "not found");
    }

    #[test]
    fn test_error_predicates() {
        let err: Error = ValidationError::BodyRequired.into();
        assert!(err.is_validation());
        assert!(!err.is_config());
        assert_eq!(err.as_validation(), Some(&ValidationError::BodyRequired));

        let err = Error::Config("missing transport".into());
        assert!(err.is_config());
        assert_eq!(err.to_string(), "Invalid configuration: missing transport");
    }
}
