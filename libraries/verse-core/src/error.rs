/// Core error types for MusicVerse
use thiserror::Error;

/// Result type alias using `VerseError`
pub type Result<T> = std::result::Result<T, VerseError>;

/// Core error type for MusicVerse
///
/// Every variant maps to a short user-facing notice via [`VerseError::notice`];
/// the client surfaces that notice and never retries.
#[derive(Error, Debug)]
pub enum VerseError {
    /// A required field was empty or malformed; raised before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The action needs a signed-in user; callers should start the login flow
    #[error("Sign-in required")]
    SignInRequired,

    /// Adding to a playlist without one selected
    #[error("No playlist selected")]
    NoPlaylistSelected,

    /// Duplicate entry
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// The same kind of submission is already in flight
    #[error("Operation already in progress: {0}")]
    Busy(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Authentication failed (bad credentials, expired session)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Backend rejected the request for lack of permission
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Backend call failed (network, server error)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl VerseError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Whether the failure happened before any backend call was made
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::SignInRequired | Self::NoPlaylistSelected | Self::Busy(_)
        )
    }

    /// Message suitable for a blocking user notification
    pub fn notice(&self) -> String {
        match self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::SignInRequired => "Please log in to continue.".to_string(),
            Self::NoPlaylistSelected => "Please select a playlist first.".to_string(),
            Self::Duplicate(what) => format!("{what} is already in this playlist."),
            Self::Busy(_) => "Please wait for the current request to finish.".to_string(),
            Self::NotFound { entity, .. } => format!("{entity} could not be found."),
            Self::Auth(msg) => msg.clone(),
            Self::PermissionDenied(_) => "You do not have permission to do that.".to_string(),
            Self::Backend(_) | Self::Serialization(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
