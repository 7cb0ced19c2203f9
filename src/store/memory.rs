//! In-memory `DocumentStore` backend — tests and the local harness.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::application::model::LoanApplication;
use crate::error::StoreError;
use crate::profile::model::{ProfilePatch, UserProfile};
use crate::store::traits::{APPLICATIONS, DocumentStore, USERS};

/// Map-backed store. Assigns identifiers and submission timestamps the way
/// a real document store would, including strictly increasing timestamps
/// so list ordering is well-defined even for rapid-fire inserts.
#[derive(Default)]
pub struct MemoryStore {
    applications: RwLock<HashMap<String, LoanApplication>>,
    profiles: RwLock<HashMap<String, UserProfile>>,
    last_stamp: RwLock<Option<DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server-assigned timestamp, strictly later than any previous one.
    async fn next_stamp(&self) -> DateTime<Utc> {
        let mut last = self.last_stamp.write().await;
        let mut now = Utc::now();
        if let Some(prev) = *last
            && now <= prev
        {
            now = prev + Duration::microseconds(1);
        }
        *last = Some(now);
        now
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_application(&self, app: &LoanApplication) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut stored = app.clone();
        stored.application_id = id.clone();
        stored.submitted_at = self.next_stamp().await;

        self.applications.write().await.insert(id.clone(), stored);
        debug!(collection = APPLICATIONS, id = %id, "Application stored");
        Ok(id)
    }

    async fn get_application(&self, id: &str) -> Result<Option<LoanApplication>, StoreError> {
        Ok(self.applications.read().await.get(id).cloned())
    }

    async fn list_applications(&self, user_id: &str) -> Result<Vec<LoanApplication>, StoreError> {
        let mut apps: Vec<LoanApplication> = self
            .applications
            .read()
            .await
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        apps.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(apps)
    }

    async fn delete_application(&self, id: &str) -> Result<(), StoreError> {
        match self.applications.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                collection: APPLICATIONS.into(),
                id: id.into(),
            }),
        }
    }

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.profiles.read().await.get(uid).cloned())
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.profiles
            .write()
            .await
            .insert(profile.uid.clone(), profile.clone());
        debug!(collection = USERS, uid = %profile.uid, "Profile written");
        Ok(())
    }

    async fn merge_profile(&self, uid: &str, patch: &ProfilePatch) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(uid).ok_or_else(|| StoreError::NotFound {
            collection: USERS.into(),
            id: uid.into(),
        })?;
        profile.apply(patch, Utc::now());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::model::{
        ApplicationStatus, Education, EmploymentStatus, EmploymentType, HomeOwnership,
        LoanPurpose, MaritalStatus, YesNo,
    };

    pub(crate) fn unsaved_application(user_id: &str) -> LoanApplication {
        LoanApplication {
            user_id: user_id.into(),
            application_id: String::new(),
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            age: 36,
            education: Education::Masters,
            income: 85_000.0,
            marital_status: MaritalStatus::Married,
            has_dependents: YesNo::Yes,
            has_co_signer: YesNo::No,
            has_mortgage: YesNo::Yes,
            employment_status: EmploymentStatus::Employed,
            employment_type: EmploymentType::FullTime,
            home_ownership: HomeOwnership::Mortgage,
            credit_score: 710,
            loan_amount: 25_000.0,
            loan_purpose: LoanPurpose::Auto,
            loan_term_months: 36,
            interest_rate: 7.5,
            months_employed: 48,
            num_credit_lines: 4,
            prediction: None,
            submitted_at: Utc::now(),
            status: ApplicationStatus::Pending,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = MemoryStore::new();
        let id = store
            .insert_application(&unsaved_application("user-1"))
            .await
            .unwrap();
        assert!(!id.is_empty());

        let fetched = store.get_application(&id).await.unwrap().unwrap();
        assert_eq!(fetched.application_id, id);
        assert_eq!(fetched.user_id, "user-1");
    }

    #[tokio::test]
    async fn get_missing_is_none_not_error() {
        let store = MemoryStore::new();
        assert!(store.get_application("nope").await.unwrap().is_none());
        assert!(store.get_profile("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_orders_newest_first_and_filters_by_owner() {
        let store = MemoryStore::new();
        let first = store
            .insert_application(&unsaved_application("user-1"))
            .await
            .unwrap();
        let second = store
            .insert_application(&unsaved_application("user-1"))
            .await
            .unwrap();
        store
            .insert_application(&unsaved_application("someone-else"))
            .await
            .unwrap();

        let apps = store.list_applications("user-1").await.unwrap();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].application_id, second);
        assert_eq!(apps[1].application_id, first);
        assert!(apps[0].submitted_at > apps[1].submitted_at);
    }

    #[tokio::test]
    async fn list_for_unknown_user_is_empty() {
        let store = MemoryStore::new();
        assert!(store.list_applications("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_reports_not_found() {
        let store = MemoryStore::new();
        let err = store.delete_application("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn merge_profile_requires_existing_document() {
        let store = MemoryStore::new();
        let err = store
            .merge_profile("ghost", &ProfilePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let profile = UserProfile::seeded("user-1", Some("Ada".into()), None, Utc::now());
        store.put_profile(&profile).await.unwrap();
        store
            .merge_profile(
                "user-1",
                &ProfilePatch {
                    mobile: Some("+1 555 0100".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let merged = store.get_profile("user-1").await.unwrap().unwrap();
        assert_eq!(merged.name.as_deref(), Some("Ada"));
        assert_eq!(merged.mobile.as_deref(), Some("+1 555 0100"));
        assert!(merged.updated_at >= profile.updated_at);
    }
}
