//! Identity provider boundary — opaque async calls plus a push-based
//! auth-state subscription.

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::watch;

use crate::error::AuthError;

/// The authenticated identity as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Stable identity reference; foreign key for every owned document.
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email_verified: bool,
}

/// A registration on the auth-state stream.
///
/// Push-based and unbounded: the provider emits on every sign-in and
/// sign-out. Dropping the stream cancels the registration. Absence of an
/// emission is indistinguishable from "still loading" — there is no
/// timeout, so consumers must tolerate a null identity until the first
/// emission arrives.
pub struct AuthStateStream {
    rx: watch::Receiver<Option<AuthUser>>,
}

impl AuthStateStream {
    pub(crate) fn new(rx: watch::Receiver<Option<AuthUser>>) -> Self {
        Self { rx }
    }

    /// Snapshot of the current state without waiting.
    pub fn current(&self) -> Option<AuthUser> {
        self.rx.borrow().clone()
    }

    /// Wait for the next emission. Returns `None` when the provider has
    /// gone away — the stream-error case, surfaced as a generic
    /// authentication-error state by consumers.
    pub async fn next(&mut self) -> Option<Option<AuthUser>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Opaque identity-provider operations. Every call either succeeds or
/// yields a provider-defined [`AuthError`]; nothing is retried here.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Email + password sign-in. Emits on the auth-state stream.
    async fn sign_in(&self, email: &str, password: SecretString) -> Result<AuthUser, AuthError>;

    /// Federated sign-in (the popup flow). Emits on the auth-state stream.
    async fn sign_in_federated(&self) -> Result<AuthUser, AuthError>;

    /// Create an account and sign it in. Emits on the auth-state stream.
    async fn sign_up(&self, email: &str, password: SecretString) -> Result<AuthUser, AuthError>;

    /// Sign out. Emits an unauthenticated state.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Dispatch a password-reset email.
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Dispatch a verification email to the signed-in user.
    async fn send_email_verification(&self) -> Result<(), AuthError>;

    /// Update display name and/or photo on the provider's own profile
    /// record for the signed-in user.
    async fn update_profile(
        &self,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<(), AuthError>;

    /// Change the signed-in user's account email.
    async fn update_email(&self, new_email: &str) -> Result<(), AuthError>;

    /// Change the signed-in user's password.
    async fn update_password(&self, new_password: SecretString) -> Result<(), AuthError>;

    /// Snapshot of the signed-in user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Register on the auth-state stream.
    fn subscribe(&self) -> AuthStateStream;
}
