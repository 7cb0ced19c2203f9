//! Profile workflow — lazy-created profile documents, photo upload, and
//! identity-provider sync.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::auth::provider::IdentityProvider;
use crate::blob::BlobStore;
use crate::error::{ProfileError, StoreError};
use crate::profile::model::{ProfilePatch, UserProfile};
use crate::store::traits::DocumentStore;

/// A photo selected for upload alongside a profile save.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Orchestrates profile reads and the save chain
/// (photo → document → identity provider).
pub struct ProfileWorkflow {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl ProfileWorkflow {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            store,
            blobs,
            identity,
        }
    }

    /// Load the profile for `uid`, creating it on first access.
    ///
    /// An absent document is seeded from the signed-in identity's display
    /// name and email, persisted, and returned. Two concurrent first loads
    /// can both decide "absent" and double-write; the seed is deterministic
    /// for a given identity, so last-write-wins is tolerated here rather
    /// than serialized.
    pub async fn load_profile(&self, uid: &str) -> Result<UserProfile, ProfileError> {
        if let Some(profile) = self.store.get_profile(uid).await? {
            return Ok(profile);
        }

        let auth = self.identity.current_user().filter(|u| u.uid == uid);
        let profile = UserProfile::seeded(
            uid,
            auth.as_ref().and_then(|u| u.display_name.clone()),
            auth.map(|u| u.email),
            Utc::now(),
        );
        info!(uid, "No profile found, creating from identity fields");
        self.store.put_profile(&profile).await?;
        Ok(profile)
    }

    /// Merge `patch` into the stored document, stamping `updatedAt`.
    /// Creates the document if it does not exist yet (merge-into-absent is
    /// an upsert, matching document-store merge semantics).
    pub async fn update_profile(
        &self,
        uid: &str,
        patch: &ProfilePatch,
    ) -> Result<(), ProfileError> {
        match self.store.merge_profile(uid, patch).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => {
                debug!(uid, "Merge into absent profile, creating document");
                let mut profile = UserProfile::seeded(uid, None, None, Utc::now());
                profile.apply(patch, profile.created_at);
                self.store.put_profile(&profile).await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Upload a photo and return its resolvable URL.
    ///
    /// The path is keyed by user and upload time so re-uploads never
    /// collide: `profile_pictures/{uid}/{millis}_{filename}`.
    pub async fn upload_photo(
        &self,
        uid: &str,
        photo: &PhotoUpload,
    ) -> Result<String, ProfileError> {
        let path = format!(
            "profile_pictures/{uid}/{}_{}",
            Utc::now().timestamp_millis(),
            photo.filename
        );
        self.blobs.upload(&path, photo.bytes.clone()).await?;
        let url = self.blobs.download_url(&path).await?;
        debug!(uid, url = %url, "Photo uploaded");
        Ok(url)
    }

    /// The full save chain, strictly sequenced with no rollback:
    ///
    /// 1. upload the photo, if one was supplied, and fold its URL into the
    ///    patch;
    /// 2. merge the document;
    /// 3. propagate name/photo to the identity provider's profile record;
    /// 4. if the email changed, update the account email.
    ///
    /// A failure at step 3 or 4 leaves the document written — the caller
    /// receives a distinct partial-failure error
    /// ([`ProfileError::document_updated`] is true) and the merged fields
    /// remain readable on the next [`load_profile`](Self::load_profile).
    pub async fn update_complete_profile(
        &self,
        uid: &str,
        mut patch: ProfilePatch,
        photo: Option<PhotoUpload>,
    ) -> Result<(), ProfileError> {
        // Email comparison must happen against the pre-save identity.
        let email_changed = match (&patch.email, self.identity.current_user()) {
            (Some(new_email), Some(user)) => *new_email != user.email,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if let Some(photo) = photo {
            let url = self.upload_photo(uid, &photo).await?;
            patch.photo_url = Some(url);
        }

        self.update_profile(uid, &patch).await?;

        if patch.name.is_some() || patch.photo_url.is_some() {
            self.identity
                .update_profile(patch.name.as_deref(), patch.photo_url.as_deref())
                .await
                .map_err(|source| {
                    warn!(uid, error = %source, "Document saved but identity sync failed");
                    ProfileError::SyncFailed { source }
                })?;
        }

        if email_changed {
            let new_email = patch.email.as_deref().unwrap_or_default();
            self.identity.update_email(new_email).await.map_err(|source| {
                warn!(uid, error = %source, "Document saved but email update failed");
                ProfileError::EmailSyncFailed { source }
            })?;
        }

        info!(uid, "Complete profile update finished");
        Ok(())
    }
}
