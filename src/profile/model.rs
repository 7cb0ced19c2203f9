//! User profile document model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One profile document per authenticated identity.
///
/// Created lazily on first access, merge-updated afterwards, never
/// hard-deleted by this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Primary key — equals the auth identity reference.
    pub uid: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A fresh profile seeded from identity-provider fields.
    pub fn seeded(
        uid: impl Into<String>,
        name: Option<String>,
        email: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            name,
            email,
            mobile: None,
            photo_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a patch into this profile, refreshing `updated_at`.
    /// Fields absent from the patch are left untouched.
    pub fn apply(&mut self, patch: &ProfilePatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(mobile) = &patch.mobile {
            self.mobile = Some(mobile.clone());
        }
        if let Some(url) = &patch.photo_url {
            self.photo_url = Some(url.clone());
        }
        self.updated_at = now;
    }
}

/// Partial profile update — merge semantics, never a document replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.mobile.is_none()
            && self.photo_url.is_none()
    }
}
