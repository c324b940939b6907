//! Request and response bodies of the hosted REST APIs.

use serde::{Deserialize, Serialize};

// =============================================================================
// Identity Toolkit
// =============================================================================

/// Body of `accounts:signInWithPassword` and `accounts:signUp`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Body of `accounts:signInWithIdp`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpRequest {
    /// `id_token=<token>&providerId=<provider>`
    pub post_body: String,
    pub request_uri: String,
    pub return_secure_token: bool,
    pub return_idp_credential: bool,
}

/// Body of `accounts:update`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest<'a> {
    pub id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<&'a str>,
    pub return_secure_token: bool,
}

/// Body of `accounts:lookup`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest<'a> {
    pub id_token: &'a str,
}

/// Response of the sign-in, sign-up, and update endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds, as a string
    #[serde(default)]
    pub expires_in: Option<String>,
}

/// Response of `accounts:lookup`.
#[derive(Debug, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub users: Vec<AuthResponse>,
}

/// Response of the secure token endpoint (snake_case on the wire).
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub expires_in: String,
}

// =============================================================================
// Realtime Database
// =============================================================================

/// Response of a `POST` (push) to the database.
#[derive(Debug, Deserialize)]
pub struct PushResponse {
    /// Generated child key
    pub name: String,
}

// =============================================================================
// Storage
// =============================================================================

/// Object metadata returned by the storage API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageObject {
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Comma-separated download tokens
    #[serde(default)]
    pub download_tokens: Option<String>,
}

impl StorageObject {
    /// First download token, if the object has one
    pub fn download_token(&self) -> Option<&str> {
        self.download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Pull a readable message out of an error body.
///
/// Identity Toolkit and Storage answer `{"error": {"message": ...}}`, the
/// database answers `{"error": "..."}`. Anything else is returned verbatim.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };
    match &value["error"] {
        serde_json::Value::String(message) => message.clone(),
        serde_json::Value::Object(error) => error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or(body)
            .to_string(),
        _ => body.to_string(),
    }
}
