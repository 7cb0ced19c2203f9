//! Error types for loan-desk.

use crate::application::model::PredictionResult;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Blob store error: {0}")]
    Blob(#[from] BlobError),

    #[error("Prediction service error: {0}")]
    Prediction(#[from] PredictionError),

    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Identity-provider errors.
///
/// Provider-defined failures are opaque strings; the caller surfaces them
/// as a generic "please sign in" state rather than interpreting them.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for {email}")]
    UserExists { email: String },

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("No account found for {email}")]
    UnknownUser { email: String },

    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Document-store errors.
///
/// "Not found" on a point read is a normal outcome (`Ok(None)`), never an
/// error. `NotFound` here is reserved for operations that require the
/// document to exist, e.g. a merge-update or a delete the backend rejects.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Blob-store errors.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Upload failed for {path}: {reason}")]
    UploadFailed { path: String, reason: String },

    #[error("No blob stored at {path}")]
    NotFound { path: String },

    #[error("Blob store error: {0}")]
    Backend(String),
}

/// Prediction-service errors.
///
/// A transport-level failure (no response at all) is distinguished from an
/// application error (the service answered with a non-2xx status).
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Prediction service unreachable: {0}")]
    Unreachable(String),

    #[error("Prediction service returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Invalid response from prediction service: {0}")]
    InvalidResponse(String),
}

impl PredictionError {
    /// A 4xx rejection of the payload — "check your inputs" territory.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status == 422 || *status == 400)
    }

    /// A 5xx failure — "try again later" territory.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }

    /// Short user-facing message per the error taxonomy.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unreachable(_) => "Prediction service unreachable. Please try again.".into(),
            Self::Api { detail, .. } if self.is_validation() => {
                format!("Please check your inputs: {detail}")
            }
            Self::Api { .. } if self.is_server_error() => {
                "The prediction service had a problem. Try again later.".into()
            }
            Self::Api { detail, .. } => detail.clone(),
            Self::InvalidResponse(_) => {
                "The prediction service returned an unexpected response.".into()
            }
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    /// Form field name (camelCase, matching the form contract).
    pub field: &'static str,
    /// Human-readable message for display next to the field.
    pub message: String,
}

/// Validation failures for a whole form.
///
/// Local by construction — produced before any network call. `touched`
/// lists every field of the form so a UI can surface per-field state even
/// for fields that passed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{} validation error(s)", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
    pub touched: Vec<&'static str>,
}

impl ValidationErrors {
    /// The message for a given field, if it failed.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Application-submission errors.
///
/// `SaveFailed` is the distinguished partial-failure: the remote prediction
/// succeeded but persistence did not. The prediction is carried so the
/// caller can still show it or discard it per policy.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Form validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Prediction failed: {0}")]
    Prediction(#[from] PredictionError),

    #[error("Prediction succeeded but saving the application failed: {source}")]
    SaveFailed {
        prediction: Box<PredictionResult>,
        source: StoreError,
    },
}

/// Profile-workflow errors.
///
/// The `*SyncFailed` variants are partial failures: the document write
/// already succeeded, so the stored profile and the identity provider have
/// diverged. They must never be collapsed into full success or full failure.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Photo upload failed: {0}")]
    Upload(#[from] BlobError),

    #[error("Profile saved, but syncing to the identity provider failed: {source}")]
    SyncFailed { source: AuthError },

    #[error("Profile saved, but updating the account email failed: {source}")]
    EmailSyncFailed { source: AuthError },
}

impl ProfileError {
    /// True when the document write succeeded before the failure.
    pub fn document_updated(&self) -> bool {
        matches!(self, Self::SyncFailed { .. } | Self::EmailSyncFailed { .. })
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
