//! Error types for the backend REST client.

use thiserror::Error;
use verse_core::VerseError;

/// Errors that can occur when talking to the hosted backend.
#[derive(Error, Debug)]
pub enum FirebaseError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service returned an error response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// No signed-in user (no ID token available)
    #[error("Authentication required")]
    AuthRequired,

    /// Sign-in or sign-up rejected; holds a user-facing message
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Token refresh failed
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid service URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse a response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Result type for backend client operations.
pub type Result<T> = std::result::Result<T, FirebaseError>;

impl From<url::ParseError> for FirebaseError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<config::ConfigError> for FirebaseError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<FirebaseError> for VerseError {
    fn from(err: FirebaseError) -> Self {
        match err {
            FirebaseError::AuthRequired | FirebaseError::TokenRefreshFailed(_) => {
                VerseError::SignInRequired
            }
            FirebaseError::AuthFailed(message) => VerseError::Auth(message),
            FirebaseError::Api { status: 401 | 403, message } => {
                VerseError::PermissionDenied(message)
            }
            FirebaseError::Api { status: 404, message } => VerseError::not_found("Resource", message),
            other => VerseError::backend(other.to_string()),
        }
    }
}
