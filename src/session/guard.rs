//! Session guard — observes the auth-state stream and gates workflows.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::auth::provider::IdentityProvider;
use crate::session::context::SessionContext;

/// Navigation targets the guard and auth flows can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    VerifyEmail,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login => write!(f, "/login"),
            Self::Dashboard => write!(f, "/dashboard"),
            Self::VerifyEmail => write!(f, "/verify-email"),
        }
    }
}

/// Navigation side-effect sink. The core never assumes a rendering layer;
/// it only asks to go somewhere.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Subscribes to the auth-state stream on construction and keeps the
/// [`SessionContext`] current:
///
/// - authenticated emission → record the identity;
/// - unauthenticated emission → clear state and navigate to login;
/// - stream gone → log and flag a generic authentication-error state.
///
/// The initial "no user yet" snapshot is *not* treated as a sign-out:
/// absence of an emission is indistinguishable from "still loading", so no
/// redirect fires until the stream actually emits.
pub struct SessionGuard {
    task: JoinHandle<()>,
}

impl SessionGuard {
    /// Subscribe and start tracking. The guard owns a background task that
    /// runs until [`stop`](Self::stop) or drop.
    pub fn spawn(
        provider: &dyn IdentityProvider,
        context: SessionContext,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let mut stream = provider.subscribe();

        // Apply an already-signed-in snapshot; a None snapshot stays
        // "loading" rather than triggering a redirect.
        if let Some(user) = stream.current() {
            debug!(uid = %user.uid, "Session already authenticated");
            context.set_user(user);
        }

        let task = tokio::spawn(async move {
            loop {
                match stream.next().await {
                    Some(Some(user)) => {
                        info!(uid = %user.uid, "Auth state: signed in");
                        context.set_user(user);
                    }
                    Some(None) => {
                        info!("Auth state: signed out");
                        context.clear();
                        navigator.navigate(Route::Login);
                    }
                    None => {
                        error!("Auth state stream closed unexpectedly");
                        context.set_auth_error();
                        break;
                    }
                }
            }
        });

        Self { task }
    }

    /// Cancel the subscription.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::time::Duration;

    use secrecy::SecretString;

    use crate::auth::memory::MemoryIdentityProvider;
    use crate::auth::provider::AuthUser;

    /// Records every navigation for assertions.
    #[derive(Default)]
    pub(crate) struct RecordingNavigator {
        routes: Mutex<Vec<Route>>,
    }

    impl RecordingNavigator {
        pub(crate) fn visited(&self) -> Vec<Route> {
            self.routes.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: Route) {
            self.routes.lock().unwrap().push(route);
        }
    }

    /// Poll until `predicate` holds or a second elapses.
    pub(crate) async fn wait_until(mut predicate: impl FnMut() -> bool) {
        for _ in 0..200 {
            if predicate() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within deadline");
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn records_identity_on_sign_in_emission() {
        let provider = MemoryIdentityProvider::new();
        provider.seed_account("ada@example.com", secret("pw"), true);
        let context = SessionContext::new();
        let navigator = Arc::new(RecordingNavigator::default());
        let _guard = SessionGuard::spawn(&provider, context.clone(), navigator.clone());

        // Still loading — no emission yet, no redirect.
        assert!(context.current().is_none());
        assert!(navigator.visited().is_empty());

        provider.sign_in("ada@example.com", secret("pw")).await.unwrap();
        wait_until(|| context.user_id().is_some()).await;
        assert_eq!(
            context.current().unwrap().email,
            "ada@example.com"
        );
    }

    #[tokio::test]
    async fn clears_and_redirects_on_sign_out_emission() {
        let provider = MemoryIdentityProvider::new();
        provider.seed_account("ada@example.com", secret("pw"), true);
        provider.sign_in("ada@example.com", secret("pw")).await.unwrap();

        let context = SessionContext::new();
        let navigator = Arc::new(RecordingNavigator::default());
        let _guard = SessionGuard::spawn(&provider, context.clone(), navigator.clone());

        // Already-authenticated snapshot applied synchronously.
        assert!(context.user_id().is_some());

        provider.sign_out().await.unwrap();
        wait_until(|| context.current().is_none()).await;
        wait_until(|| navigator.visited() == vec![Route::Login]).await;
    }

    #[tokio::test]
    async fn provider_drop_surfaces_auth_error() {
        let provider = MemoryIdentityProvider::new();
        let context = SessionContext::new();
        let navigator = Arc::new(RecordingNavigator::default());
        let _guard = SessionGuard::spawn(&provider, context.clone(), navigator.clone());

        drop(provider);
        wait_until(|| context.has_auth_error()).await;
        // A stream error is not a sign-out — no redirect fires.
        assert!(navigator.visited().is_empty());
    }
}
