//! Unified `DocumentStore` trait — single async interface for persistence.
//!
//! The document store is the sole source of truth for applications and
//! profiles; callers hold only transient, request-scoped copies.

use async_trait::async_trait;

use crate::application::model::LoanApplication;
use crate::error::StoreError;
use crate::profile::model::{ProfilePatch, UserProfile};

/// Collection name for loan applications.
pub const APPLICATIONS: &str = "loan-application";

/// Collection name for user profiles.
pub const USERS: &str = "users";

/// Backend-agnostic document store covering applications and profiles.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // ── Applications ────────────────────────────────────────────────

    /// Insert a new application. The store assigns the identifier and the
    /// submission timestamp; both are returned on subsequent reads. The
    /// assigned identifier is returned.
    async fn insert_application(&self, app: &LoanApplication) -> Result<String, StoreError>;

    /// Point read. Not-found is a normal outcome — `Ok(None)`, never an
    /// error.
    async fn get_application(&self, id: &str) -> Result<Option<LoanApplication>, StoreError>;

    /// All applications owned by `user_id`, ordered by submission time
    /// descending. An unknown user yields an empty vec.
    async fn list_applications(&self, user_id: &str) -> Result<Vec<LoanApplication>, StoreError>;

    /// Delete by identifier. Backends may report `NotFound` for a missing
    /// id; the workflow layer normalizes that to success.
    async fn delete_application(&self, id: &str) -> Result<(), StoreError>;

    // ── Profiles ────────────────────────────────────────────────────

    /// Point read by identity reference.
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Full document write — used by lazy creation. Overwrites any
    /// existing document for the same uid (last write wins).
    async fn put_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;

    /// Field-wise merge into an existing document, refreshing its
    /// `updatedAt` stamp. `NotFound` if no document exists for `uid`.
    async fn merge_profile(&self, uid: &str, patch: &ProfilePatch) -> Result<(), StoreError>;
}
