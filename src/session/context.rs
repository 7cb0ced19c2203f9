//! Explicit session context — the current identity, threaded into
//! workflows instead of read from a global.

use std::sync::{Arc, RwLock};

use crate::auth::provider::AuthUser;
use crate::error::AuthError;

#[derive(Debug, Default)]
struct SessionState {
    user: Option<AuthUser>,
    auth_error: bool,
}

/// Cheap-clone handle on the session state. The [`SessionGuard`] refreshes
/// it from auth-state emissions; workflows read it per call.
///
/// Until the first emission arrives, `current()` is `None` — callers must
/// treat that as "still loading", not "signed out".
///
/// [`SessionGuard`]: crate::session::guard::SessionGuard
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the signed-in user, if any.
    pub fn current(&self) -> Option<AuthUser> {
        self.inner.read().expect("lock poisoned").user.clone()
    }

    /// The owning identity reference, if signed in.
    pub fn user_id(&self) -> Option<String> {
        self.current().map(|u| u.uid)
    }

    /// The signed-in user, or `NotSignedIn` for workflows that need one.
    pub fn require(&self) -> Result<AuthUser, AuthError> {
        self.current().ok_or(AuthError::NotSignedIn)
    }

    /// Whether the auth-state stream itself failed. Surfaced as a generic
    /// "please sign in" state, never retried.
    pub fn has_auth_error(&self) -> bool {
        self.inner.read().expect("lock poisoned").auth_error
    }

    pub(crate) fn set_user(&self, user: AuthUser) {
        let mut state = self.inner.write().expect("lock poisoned");
        state.user = Some(user);
        state.auth_error = false;
    }

    pub(crate) fn clear(&self) {
        self.inner.write().expect("lock poisoned").user = None;
    }

    pub(crate) fn set_auth_error(&self) {
        let mut state = self.inner.write().expect("lock poisoned");
        state.user = None;
        state.auth_error = true;
    }
}
