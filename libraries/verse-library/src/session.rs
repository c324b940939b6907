//! Auth session provider
//!
//! Wraps the auth backend for the rest of the app: sign-in, registration
//! (account + profile photo + `users/<uid>` record), sign-out, and an
//! observable auth state with an explicit subscription lifecycle.

use crate::{context::LibraryContext, upload::BlobFile};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use verse_core::{
    paths, AuthState, FederatedCredential, Result, User, UserProfile, VerseError,
};

/// Email/password registration form
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub photo: Option<BlobFile>,
}

impl RegistrationForm {
    /// Check every field before any backend call
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(VerseError::invalid_input("Please fill in all fields."));
        }
        if self.password != self.confirm_password {
            return Err(VerseError::invalid_input("Passwords do not match."));
        }
        match &self.photo {
            Some(photo) if !photo.is_empty() => Ok(()),
            _ => Err(VerseError::invalid_input("Please choose a profile photo.")),
        }
    }
}

/// Active auth state subscription
///
/// The callback stops firing after `unsubscribe` or when this is dropped.
#[derive(Debug)]
pub struct SessionSubscription {
    task: Option<JoinHandle<()>>,
}

impl SessionSubscription {
    /// Stop delivering auth state changes
    pub fn unsubscribe(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// App-wide auth session
#[derive(Clone)]
pub struct AuthSession {
    ctx: LibraryContext,
}

impl AuthSession {
    pub fn new(ctx: LibraryContext) -> Self {
        Self { ctx }
    }

    /// Deliver the current auth state, then every change, to `callback`
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<F>(&self, callback: F) -> SessionSubscription
    where
        F: Fn(&AuthState) + Send + 'static,
    {
        let mut rx = self.ctx.auth_arc().auth_state();
        let task = tokio::spawn(async move {
            callback(&rx.borrow_and_update());
            while rx.changed().await.is_ok() {
                callback(&rx.borrow_and_update());
            }
        });
        SessionSubscription { task: Some(task) }
    }

    /// Raw watch receiver for pull-style consumers
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.ctx.auth().auth_state()
    }

    /// Current auth state
    pub fn state(&self) -> AuthState {
        self.ctx.auth().auth_state().borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.ctx.current_user()
    }

    /// Email/password sign-in
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(VerseError::invalid_input("Please enter your email and password."));
        }

        let user = self
            .ctx
            .auth()
            .sign_in_with_password(email.trim(), password)
            .await
            .inspect_err(|e| warn!(error = %e, "Sign-in failed"))?;
        info!(uid = %user.id, "User signed in");
        Ok(user)
    }

    /// Federated sign-in
    pub async fn sign_in_with_provider(&self, credential: &FederatedCredential) -> Result<User> {
        let user = self
            .ctx
            .auth()
            .sign_in_with_provider(credential)
            .await
            .inspect_err(|e| warn!(error = %e, provider = %credential.provider_id, "Provider sign-in failed"))?;
        info!(uid = %user.id, provider = %credential.provider_id, "User signed in");
        Ok(user)
    }

    /// Create an account with a profile photo and profile record
    pub async fn register(&self, form: RegistrationForm) -> Result<User> {
        form.validate()?;
        let RegistrationForm {
            name,
            email,
            password,
            photo,
            ..
        } = form;
        let Some(photo) = photo else {
            return Err(VerseError::invalid_input("Please choose a profile photo."));
        };

        let user = self
            .ctx
            .auth()
            .create_account(email.trim(), &password)
            .await
            .inspect_err(|e| warn!(error = %e, "Account creation failed"))?;

        let photo_path = paths::profile_photo_blob(&user.id);
        self.ctx
            .blobs()
            .upload(&photo_path, photo.bytes, &photo.content_type)
            .await?;
        let photo_url = self.ctx.blobs().download_url(&photo_path).await?;

        let user = self
            .ctx
            .auth()
            .update_profile(Some(name.trim()), Some(&photo_url))
            .await?;
        self.write_profile(&user).await?;

        info!(uid = %user.id, "User registered");
        Ok(user)
    }

    /// Federated sign-up: sign in, then write the profile record
    pub async fn register_with_provider(&self, credential: &FederatedCredential) -> Result<User> {
        let user = self.sign_in_with_provider(credential).await?;
        self.write_profile(&user).await?;
        info!(uid = %user.id, "User registered with provider");
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.ctx.auth().sign_out().await?;
        info!("User signed out");
        Ok(())
    }

    async fn write_profile(&self, user: &User) -> Result<()> {
        let profile = serde_json::to_value(UserProfile::from(user))?;
        self.ctx
            .store()
            .set(&paths::user_profile(&user.id), profile)
            .await
            .inspect_err(|e| warn!(error = %e, uid = %user.id, "Profile write failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> BlobFile {
        BlobFile::new("me.png", "image/png", vec![0x89, 0x50])
    }

    #[test]
    fn registration_requires_every_field() {
        let form = RegistrationForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            photo: None,
        };
        assert!(form.validate().is_err());

        let form = RegistrationForm {
            photo: Some(photo()),
            ..form
        };
        assert!(form.validate().is_ok());

        let form = RegistrationForm {
            name: "  ".into(),
            ..form
        };
        assert!(matches!(form.validate(), Err(VerseError::InvalidInput(_))));
    }

    #[test]
    fn registration_requires_matching_passwords() {
        let form = RegistrationForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
            photo: Some(photo()),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.notice(), "Passwords do not match.");
    }
}
