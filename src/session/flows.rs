//! Authentication flows — login, registration, logout, password reset.
//!
//! Each flow is one linear chain of identity-provider calls plus a
//! navigation side effect. Failures are logged, surfaced as [`AuthError`],
//! and never retried.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{info, warn};

use crate::auth::provider::{AuthUser, IdentityProvider};
use crate::error::AuthError;
use crate::session::guard::{Navigator, Route};

/// Entry-point orchestration around the identity provider.
pub struct AuthFlows {
    provider: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
}

impl AuthFlows {
    pub fn new(provider: Arc<dyn IdentityProvider>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            provider,
            navigator,
        }
    }

    /// Email + password sign-in. Verified accounts land on the dashboard;
    /// unverified ones are routed to the verify-email screen.
    pub async fn login(&self, email: &str, password: SecretString) -> Result<AuthUser, AuthError> {
        match self.provider.sign_in(email, password).await {
            Ok(user) => {
                let route = if user.email_verified {
                    Route::Dashboard
                } else {
                    Route::VerifyEmail
                };
                self.navigator.navigate(route);
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.navigator.navigate(Route::Login);
                Err(e)
            }
        }
    }

    /// Federated popup sign-in. The provider vouches for the address, so
    /// this goes straight to the dashboard.
    pub async fn login_federated(&self) -> Result<AuthUser, AuthError> {
        let user = self.provider.sign_in_federated().await.inspect_err(|e| {
            warn!(error = %e, "Federated login failed");
        })?;
        self.navigator.navigate(Route::Dashboard);
        Ok(user)
    }

    /// Create an account, dispatch a verification email, and route to the
    /// verify-email screen. A failed dispatch falls back to login — the
    /// account exists either way.
    pub async fn register(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<AuthUser, AuthError> {
        let user = match self.provider.sign_up(email, password).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.navigator.navigate(Route::Login);
                return Err(e);
            }
        };
        info!(uid = %user.uid, "Registration successful");

        match self.provider.send_email_verification().await {
            Ok(()) => self.navigator.navigate(Route::VerifyEmail),
            Err(e) => {
                warn!(error = %e, "Could not send verification email");
                self.navigator.navigate(Route::Login);
            }
        }
        Ok(user)
    }

    /// Sign out and route to login.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        self.navigator.navigate(Route::Login);
        Ok(())
    }

    /// Dispatch a password-reset email and route to the verify-email
    /// screen so the user knows to check their inbox.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        self.provider.send_password_reset(email).await.inspect_err(|e| {
            warn!(error = %e, "Password reset dispatch failed");
        })?;
        self.navigator.navigate(Route::VerifyEmail);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::auth::memory::MemoryIdentityProvider;
    use crate::session::guard::tests::RecordingNavigator;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn flows_with(provider: MemoryIdentityProvider) -> (AuthFlows, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::default());
        let flows = AuthFlows::new(Arc::new(provider), navigator.clone());
        (flows, navigator)
    }

    #[tokio::test]
    async fn verified_login_goes_to_dashboard() {
        let provider = MemoryIdentityProvider::new();
        provider.seed_account("ada@example.com", secret("pw"), true);
        let (flows, navigator) = flows_with(provider);

        flows.login("ada@example.com", secret("pw")).await.unwrap();
        assert_eq!(navigator.visited(), vec![Route::Dashboard]);
    }

    #[tokio::test]
    async fn unverified_login_goes_to_verify_email() {
        let provider = MemoryIdentityProvider::new();
        provider.seed_account("ada@example.com", secret("pw"), false);
        let (flows, navigator) = flows_with(provider);

        flows.login("ada@example.com", secret("pw")).await.unwrap();
        assert_eq!(navigator.visited(), vec![Route::VerifyEmail]);
    }

    #[tokio::test]
    async fn failed_login_stays_on_login() {
        let provider = MemoryIdentityProvider::new();
        provider.seed_account("ada@example.com", secret("pw"), true);
        let (flows, navigator) = flows_with(provider);

        let err = flows
            .login("ada@example.com", secret("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(navigator.visited(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn register_dispatches_verification_then_routes() {
        let (flows, navigator) = flows_with(MemoryIdentityProvider::new());

        let user = flows
            .register("new@example.com", secret("pw"))
            .await
            .unwrap();
        assert!(!user.email_verified);
        assert_eq!(navigator.visited(), vec![Route::VerifyEmail]);
    }

    #[tokio::test]
    async fn duplicate_register_routes_to_login() {
        let provider = MemoryIdentityProvider::new();
        provider.seed_account("taken@example.com", secret("pw"), true);
        let (flows, navigator) = flows_with(provider);

        let err = flows
            .register("taken@example.com", secret("pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserExists { .. }));
        assert_eq!(navigator.visited(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn logout_routes_to_login() {
        let provider = MemoryIdentityProvider::new();
        provider.seed_account("ada@example.com", secret("pw"), true);
        provider.sign_in("ada@example.com", secret("pw")).await.unwrap();
        let (flows, navigator) = flows_with(provider);

        flows.logout().await.unwrap();
        assert_eq!(navigator.visited(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn forgot_password_routes_on_success_only() {
        let provider = MemoryIdentityProvider::new();
        provider.seed_account("ada@example.com", secret("pw"), true);
        let (flows, navigator) = flows_with(provider);

        flows.forgot_password("ada@example.com").await.unwrap();
        assert_eq!(navigator.visited(), vec![Route::VerifyEmail]);

        let err = flows.forgot_password("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownUser { .. }));
        // No extra navigation on failure.
        assert_eq!(navigator.visited(), vec![Route::VerifyEmail]);
    }
}
