//! Authentication against the Identity Toolkit REST API.

use crate::client::{FirebaseClient, Session};
use crate::error::{FirebaseError, Result};
use crate::types::{
    error_message, AuthResponse, IdpRequest, LookupRequest, LookupResponse, PasswordRequest,
    UpdateProfileRequest,
};
use async_trait::async_trait;
use reqwest::Response;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use verse_core::{AuthBackend, AuthState, FederatedCredential, User, UserId};

/// Redirect URI sent with IdP sign-in; the token is passed in the body
const IDP_REQUEST_URI: &str = "http://localhost";

impl FirebaseClient {
    /// Fetch the account behind an ID token.
    pub(crate) async fn lookup(&self, id_token: &str) -> Result<User> {
        let response = self
            .identity_call("lookup", &LookupRequest { id_token })
            .await?;
        let lookup: LookupResponse = Self::parse(response).await?;
        lookup
            .users
            .into_iter()
            .next()
            .map(|account| user_from(&account))
            .ok_or_else(|| FirebaseError::AuthFailed("Account not found.".to_string()))
    }

    /// POST to an `accounts:*` endpoint, mapping rejections to `AuthFailed`.
    async fn identity_call<T: Serialize + ?Sized>(&self, method: &str, body: &T) -> Result<Response> {
        let url = self.identity_url(method)?;
        debug!(method, "Identity request");

        let response = self.http.post(url).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let code = error_message(&body);
        warn!(method, status = %status, code = %code, "Identity request rejected");
        Err(FirebaseError::AuthFailed(friendly_message(&code)))
    }

    /// Store the session from a sign-in style response and publish it.
    async fn start_session(&self, response: Response) -> Result<User> {
        let account: AuthResponse = Self::parse(response).await?;
        let (Some(id_token), Some(refresh_token)) =
            (account.id_token.clone(), account.refresh_token.clone())
        else {
            return Err(FirebaseError::ParseError(
                "Sign-in response without tokens".to_string(),
            ));
        };

        let user = user_from(&account);
        self.set_session(Session {
            user: user.clone(),
            id_token,
            refresh_token,
            expires_at: Session::expires_at(account.expires_in.as_deref()),
        })
        .await;
        Ok(user)
    }
}

#[async_trait]
impl AuthBackend for FirebaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> verse_core::Result<User> {
        let response = self
            .identity_call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let user = self.start_session(response).await?;
        info!(uid = %user.id, "Signed in");
        Ok(user)
    }

    async fn sign_in_with_provider(
        &self,
        credential: &FederatedCredential,
    ) -> verse_core::Result<User> {
        let request = IdpRequest {
            post_body: format!(
                "id_token={}&providerId={}",
                credential.id_token, credential.provider_id
            ),
            request_uri: IDP_REQUEST_URI.to_string(),
            return_secure_token: true,
            return_idp_credential: true,
        };

        let response = self.identity_call("signInWithIdp", &request).await?;
        let user = self.start_session(response).await?;
        info!(uid = %user.id, provider = %credential.provider_id, "Signed in with provider");
        Ok(user)
    }

    async fn create_account(&self, email: &str, password: &str) -> verse_core::Result<User> {
        let response = self
            .identity_call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let user = self.start_session(response).await?;
        info!(uid = %user.id, "Account created");
        Ok(user)
    }

    async fn update_profile(
        &self,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> verse_core::Result<User> {
        let id_token = self.require_id_token().await?;
        let response = self
            .identity_call(
                "update",
                &UpdateProfileRequest {
                    id_token: &id_token,
                    display_name,
                    photo_url,
                    return_secure_token: true,
                },
            )
            .await?;
        let account: AuthResponse = Self::parse(response).await?;

        let user = {
            let mut guard = self.session.write().await;
            let session = guard.as_mut().ok_or(FirebaseError::AuthRequired)?;
            let user = &mut session.user;
            user.display_name = account.display_name.or_else(|| user.display_name.take());
            user.photo_url = account.photo_url.or_else(|| user.photo_url.take());
            if account.email.is_some() {
                user.email = account.email;
            }
            if let (Some(id_token), Some(refresh_token)) = (account.id_token, account.refresh_token) {
                session.id_token = id_token;
                session.refresh_token = refresh_token;
                session.expires_at = Session::expires_at(account.expires_in.as_deref());
            }
            session.user.clone()
        };

        self.publish(AuthState::SignedIn(user.clone()));
        debug!(uid = %user.id, "Profile updated");
        Ok(user)
    }

    async fn sign_out(&self) -> verse_core::Result<()> {
        self.clear_session().await;
        info!("Signed out");
        Ok(())
    }

    fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.auth_tx.subscribe()
    }
}

fn user_from(account: &AuthResponse) -> User {
    User {
        email: account.email.clone(),
        display_name: account.display_name.clone().filter(|n| !n.is_empty()),
        photo_url: account.photo_url.clone().filter(|u| !u.is_empty()),
        ..User::new(UserId::new(account.local_id.clone()))
    }
}

/// Map an Identity Toolkit error code to a message for the user.
///
/// Codes may carry a detail suffix (`WEAK_PASSWORD : Password should...`).
fn friendly_message(code: &str) -> String {
    let key = code.split([' ', ':']).next().unwrap_or(code);
    match key {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "Invalid email or password.".to_string()
        }
        "EMAIL_EXISTS" => "Email is already in use.".to_string(),
        "WEAK_PASSWORD" => "Password should be at least 6 characters.".to_string(),
        "INVALID_EMAIL" => "Please enter a valid email address.".to_string(),
        "USER_DISABLED" => "This account has been disabled.".to_string(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Please try again later.".to_string(),
        "INVALID_IDP_RESPONSE" => "Sign-in with this provider failed.".to_string(),
        _ => code.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friendly_messages() {
        assert_eq!(friendly_message("EMAIL_NOT_FOUND"), "Invalid email or password.");
        assert_eq!(
            friendly_message("INVALID_LOGIN_CREDENTIALS"),
            "Invalid email or password."
        );
        assert_eq!(
            friendly_message("WEAK_PASSWORD : Password should be at least 6 characters"),
            "Password should be at least 6 characters."
        );
        assert_eq!(friendly_message("SOMETHING_NEW"), "SOMETHING_NEW");
    }

    #[test]
    fn test_user_from_drops_empty_profile_fields() {
        let account = AuthResponse {
            local_id: "uid-1".into(),
            email: Some("ada@example.com".into()),
            display_name: Some(String::new()),
            photo_url: None,
            id_token: None,
            refresh_token: None,
            expires_in: None,
        };

        let user = user_from(&account);
        assert_eq!(user.id.as_str(), "uid-1");
        assert_eq!(user.display_name, None);
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    }
}
