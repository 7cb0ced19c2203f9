//! In-memory identity provider — local harness and tests.
//!
//! Credential storage is process-local; reset and verification emails are
//! log-only side effects. Test hooks (`mark_email_verified`,
//! `verification_dispatches`) stand in for the user clicking links.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::sync::RwLock;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::auth::provider::{AuthStateStream, AuthUser, IdentityProvider};
use crate::error::AuthError;

struct Account {
    uid: String,
    password: SecretString,
    display_name: Option<String>,
    photo_url: Option<String>,
    email_verified: bool,
}

/// Map-backed provider keyed by email.
pub struct MemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    state: watch::Sender<Option<AuthUser>>,
    federated: RwLock<Option<AuthUser>>,
    reset_dispatches: AtomicUsize,
    verification_dispatches: AtomicUsize,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            accounts: RwLock::new(HashMap::new()),
            state,
            federated: RwLock::new(None),
            reset_dispatches: AtomicUsize::new(0),
            verification_dispatches: AtomicUsize::new(0),
        }
    }
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the identity returned by the federated popup flow.
    pub fn with_federated_user(self, user: AuthUser) -> Self {
        *self.federated.write().expect("lock poisoned") = Some(user);
        self
    }

    /// Pre-register an account without signing it in.
    pub fn seed_account(&self, email: &str, password: SecretString, verified: bool) -> String {
        let uid = Uuid::new_v4().to_string();
        self.accounts.write().expect("lock poisoned").insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password,
                display_name: None,
                photo_url: None,
                email_verified: verified,
            },
        );
        uid
    }

    /// Simulate the user clicking the verification link.
    pub fn mark_email_verified(&self, email: &str) {
        if let Some(account) = self.accounts.write().expect("lock poisoned").get_mut(email) {
            account.email_verified = true;
        }
    }

    /// How many verification emails were dispatched.
    pub fn verification_dispatches(&self) -> usize {
        self.verification_dispatches.load(Ordering::SeqCst)
    }

    /// How many password-reset emails were dispatched.
    pub fn reset_dispatches(&self) -> usize {
        self.reset_dispatches.load(Ordering::SeqCst)
    }

    fn auth_user(&self, email: &str, account: &Account) -> AuthUser {
        AuthUser {
            uid: account.uid.clone(),
            email: email.to_string(),
            display_name: account.display_name.clone(),
            photo_url: account.photo_url.clone(),
            email_verified: account.email_verified,
        }
    }

    fn require_signed_in(&self) -> Result<AuthUser, AuthError> {
        self.state.borrow().clone().ok_or(AuthError::NotSignedIn)
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: SecretString) -> Result<AuthUser, AuthError> {
        let user = {
            let accounts = self.accounts.read().expect("lock poisoned");
            let account = accounts.get(email).ok_or_else(|| AuthError::UnknownUser {
                email: email.to_string(),
            })?;
            if account.password.expose_secret() != password.expose_secret() {
                return Err(AuthError::InvalidCredentials);
            }
            self.auth_user(email, account)
        };

        info!(uid = %user.uid, "Signed in");
        self.state.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_federated(&self) -> Result<AuthUser, AuthError> {
        let user = self
            .federated
            .read()
            .expect("lock poisoned")
            .clone()
            .ok_or_else(|| AuthError::Provider("no federated identity configured".into()))?;

        info!(uid = %user.uid, "Signed in (federated)");
        self.state.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: SecretString) -> Result<AuthUser, AuthError> {
        let user = {
            let mut accounts = self.accounts.write().expect("lock poisoned");
            if accounts.contains_key(email) {
                return Err(AuthError::UserExists {
                    email: email.to_string(),
                });
            }
            let account = Account {
                uid: Uuid::new_v4().to_string(),
                password,
                display_name: None,
                photo_url: None,
                email_verified: false,
            };
            let user = self.auth_user(email, &account);
            accounts.insert(email.to_string(), account);
            user
        };

        info!(uid = %user.uid, "Account created");
        self.state.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        info!("Signed out");
        self.state.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        if !self.accounts.read().expect("lock poisoned").contains_key(email) {
            return Err(AuthError::UnknownUser {
                email: email.to_string(),
            });
        }
        self.reset_dispatches.fetch_add(1, Ordering::SeqCst);
        info!(email, "Password reset email dispatched");
        Ok(())
    }

    async fn send_email_verification(&self) -> Result<(), AuthError> {
        let user = self.require_signed_in()?;
        self.verification_dispatches.fetch_add(1, Ordering::SeqCst);
        info!(email = %user.email, "Verification email dispatched");
        Ok(())
    }

    async fn update_profile(
        &self,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<(), AuthError> {
        let user = self.require_signed_in()?;

        {
            let mut accounts = self.accounts.write().expect("lock poisoned");
            let account = accounts
                .get_mut(&user.email)
                .ok_or(AuthError::NotSignedIn)?;
            if let Some(name) = display_name {
                account.display_name = Some(name.to_string());
            }
            if let Some(url) = photo_url {
                account.photo_url = Some(url.to_string());
            }
        }

        self.state.send_modify(|current| {
            if let Some(current) = current {
                if let Some(name) = display_name {
                    current.display_name = Some(name.to_string());
                }
                if let Some(url) = photo_url {
                    current.photo_url = Some(url.to_string());
                }
            }
        });
        Ok(())
    }

    async fn update_email(&self, new_email: &str) -> Result<(), AuthError> {
        let user = self.require_signed_in()?;

        {
            let mut accounts = self.accounts.write().expect("lock poisoned");
            if accounts.contains_key(new_email) {
                return Err(AuthError::UserExists {
                    email: new_email.to_string(),
                });
            }
            let mut account = accounts.remove(&user.email).ok_or(AuthError::NotSignedIn)?;
            // A changed address needs re-verification.
            account.email_verified = false;
            accounts.insert(new_email.to_string(), account);
        }

        self.state.send_modify(|current| {
            if let Some(current) = current {
                current.email = new_email.to_string();
                current.email_verified = false;
            }
        });
        info!(email = new_email, "Account email updated");
        Ok(())
    }

    async fn update_password(&self, new_password: SecretString) -> Result<(), AuthError> {
        let user = self.require_signed_in()?;
        let mut accounts = self.accounts.write().expect("lock poisoned");
        let account = accounts
            .get_mut(&user.email)
            .ok_or(AuthError::NotSignedIn)?;
        account.password = new_password;
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> AuthStateStream {
        AuthStateStream::new(self.state.subscribe())
    }
}
