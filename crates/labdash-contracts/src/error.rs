//! Error types for the LABDASH client stack.
//!
//! All fallible operations return `DashResult<T>`. Stores catch these at
//! their boundary and keep the `Display` text as the user-visible message.

use thiserror::Error;

/// The unified error type for the LABDASH crates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashError {
    /// The backend could not be reached, answered with a non-success status,
    /// or returned a payload that could not be decoded.
    #[error("fetch failed: {reason}")]
    Fetch { reason: String },

    /// Credentials were rejected or the session token has expired.
    #[error("authentication failed: {reason}")]
    Auth { reason: String },

    /// A client-side check rejected the input before any network call.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// The operation needs an authenticated session and there is none.
    #[error("no authenticated session")]
    NotAuthenticated,

    /// The requested record does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The token store could not read or write its backing storage.
    #[error("storage error: {reason}")]
    Storage { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl DashError {
    /// Shorthand for `DashError::Fetch`.
    pub fn fetch(reason: impl Into<String>) -> Self {
        Self::Fetch { reason: reason.into() }
    }

    /// Shorthand for `DashError::Auth`.
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth { reason: reason.into() }
    }

    /// Shorthand for `DashError::Validation`.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation { reason: reason.into() }
    }
}

/// Convenience alias used throughout the LABDASH crates.
pub type DashResult<T> = Result<T, DashError>;
