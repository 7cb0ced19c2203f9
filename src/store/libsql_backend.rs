//! libSQL backend — async `DocumentStore` implementation.
//!
//! Documents are stored whole as JSON, one row per document, with the
//! owner and submission time lifted into columns for filtering and
//! ordering. Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::model::LoanApplication;
use crate::error::StoreError;
use crate::profile::model::{ProfilePatch, UserProfile};
use crate::store::traits::{APPLICATIONS, DocumentStore, USERS};

/// libSQL document store.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    last_stamp: RwLock<Option<DateTime<Utc>>>,
}

impl LibSqlStore {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Backend(format!("failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Backend(format!("failed to open database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Backend(format!("failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
            last_stamp: RwLock::new(None),
        };
        store.init_schema().await?;
        info!(path = %path.display(), "Document store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Backend(format!("failed to create in-memory db: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Backend(format!("failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
            last_stamp: RwLock::new(None),
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS applications (
                     id TEXT PRIMARY KEY,
                     user_id TEXT NOT NULL,
                     submitted_at TEXT NOT NULL,
                     record TEXT NOT NULL
                 );
                 CREATE INDEX IF NOT EXISTS idx_applications_owner
                     ON applications(user_id, submitted_at);
                 CREATE TABLE IF NOT EXISTS profiles (
                     uid TEXT PRIMARY KEY,
                     updated_at TEXT NOT NULL,
                     document TEXT NOT NULL
                 );",
            )
            .await
            .map_err(|e| StoreError::Backend(format!("schema init failed: {e}")))?;
        Ok(())
    }

    /// Server-assigned timestamp, strictly later than any previous one so
    /// the descending list order is total.
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

/// Fixed-width RFC 3339 — lexicographic order equals chronological order,
/// which the `ORDER BY submitted_at` clauses rely on.
fn stamp_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_application(json: &str) -> Result<LoanApplication, StoreError> {
    serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_profile(json: &str) -> Result<UserProfile, StoreError> {
    serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn backend_err(e: libsql::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl DocumentStore for LibSqlStore {
    async fn insert_application(&self, app: &LoanApplication) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let stamp = self.next_stamp().await;

        let mut stored = app.clone();
        stored.application_id = id.clone();
        stored.submitted_at = stamp;
        let record =
            serde_json::to_string(&stored).map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO applications (id, user_id, submitted_at, record)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    id.clone(),
                    stored.user_id.clone(),
                    stamp_to_str(stamp),
                    record
                ],
            )
            .await
            .map_err(backend_err)?;

        debug!(collection = APPLICATIONS, id = %id, "Application stored");
        Ok(id)
    }

    async fn get_application(&self, id: &str) -> Result<Option<LoanApplication>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT record FROM applications WHERE id = ?1",
                params![id],
            )
            .await
            .map_err(backend_err)?;

        match rows.next().await.map_err(backend_err)? {
            Some(row) => {
                let record: String = row.get(0).map_err(backend_err)?;
                Ok(Some(decode_application(&record)?))
            }
            None => Ok(None),
        }
    }

    async fn list_applications(&self, user_id: &str) -> Result<Vec<LoanApplication>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT record FROM applications
                 WHERE user_id = ?1
                 ORDER BY submitted_at DESC",
                params![user_id],
            )
            .await
            .map_err(backend_err)?;

        let mut apps = Vec::new();
        while let Some(row) = rows.next().await.map_err(backend_err)? {
            let record: String = row.get(0).map_err(backend_err)?;
            apps.push(decode_application(&record)?);
        }
        Ok(apps)
    }

    async fn delete_application(&self, id: &str) -> Result<(), StoreError> {
        let affected = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1", params![id])
            .await
            .map_err(backend_err)?;

        if affected == 0 {
            return Err(StoreError::NotFound {
                collection: APPLICATIONS.into(),
                id: id.into(),
            });
        }
        Ok(())
    }

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        let mut rows = self
            .conn
            .query("SELECT document FROM profiles WHERE uid = ?1", params![uid])
            .await
            .map_err(backend_err)?;

        match rows.next().await.map_err(backend_err)? {
            Some(row) => {
                let document: String = row.get(0).map_err(backend_err)?;
                Ok(Some(decode_profile(&document)?))
            }
            None => Ok(None),
        }
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let document = serde_json::to_string(profile)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO profiles (uid, updated_at, document) VALUES (?1, ?2, ?3)
                 ON CONFLICT(uid) DO UPDATE SET
                     updated_at = excluded.updated_at,
                     document = excluded.document",
                params![
                    profile.uid.clone(),
                    stamp_to_str(profile.updated_at),
                    document
                ],
            )
            .await
            .map_err(backend_err)?;

        debug!(collection = USERS, uid = %profile.uid, "Profile written");
        Ok(())
    }

    async fn merge_profile(&self, uid: &str, patch: &ProfilePatch) -> Result<(), StoreError> {
        let mut profile = self
            .get_profile(uid)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: USERS.into(),
                id: uid.into(),
            })?;

        profile.apply(patch, Utc::now());
        self.put_profile(&profile).await
    }
}
