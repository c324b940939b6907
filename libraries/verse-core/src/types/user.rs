/// User and auth-state domain types
use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// Signed-in identity as reported by the auth backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Auth uid
    pub id: UserId,

    /// Email, absent for some federated providers
    pub email: Option<String>,

    /// Display name
    pub display_name: Option<String>,

    /// Profile photo URL
    pub photo_url: Option<String>,
}

impl User {
    /// Create a user with only an id
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            email: None,
            display_name: None,
            photo_url: None,
        }
    }

    /// Name to greet the user with
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("User")
    }
}

/// Stored shape of `users/<uid>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name
    pub name: Option<String>,

    /// Email
    pub email: Option<String>,

    /// Profile photo URL
    pub profile_photo: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            name: user.display_name.clone(),
            email: user.email.clone(),
            profile_photo: user.photo_url.clone(),
        }
    }
}

/// Auth state broadcast to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// The backend has not reported yet
    #[default]
    Loading,

    /// No user signed in
    SignedOut,

    /// A user is signed in
    SignedIn(User),
}

impl AuthState {
    /// The signed-in user, if any
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::Loading | Self::SignedOut => None,
        }
    }

    /// Whether the initial auth check is still pending
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Token obtained from a federated identity provider (e.g. Google)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedCredential {
    /// Provider id, e.g. `google.com`
    pub provider_id: String,

    /// Provider-issued id token
    pub id_token: String,
}

impl FederatedCredential {
    /// Create a credential for a provider
    pub fn new(provider_id: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            id_token: id_token.into(),
        }
    }
}
