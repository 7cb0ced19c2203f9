//! Application workflow — validate, predict, persist, retrieve.
//!
//! One linear chain per operation: each step's side effect completes
//! before the next starts, every failure is terminal for its chain, and
//! nothing is retried.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::application::form::{LoanForm, ValidatedApplication};
use crate::application::model::{ApplicationStatus, LoanApplication, PredictionResult};
use crate::config::{AppConfig, SaveFailurePolicy};
use crate::error::{StoreError, SubmitError};
use crate::predict::client::PredictionService;
use crate::predict::payload::PredictionPayload;
use crate::session::context::SessionContext;
use crate::store::traits::DocumentStore;

/// Outcome of a submission.
///
/// `PredictedUnsaved` is the deliberate partial-success shape: the model
/// answered but the record could not be written. It is only produced under
/// [`SaveFailurePolicy::SurfacePrediction`]; the `FailSubmission` policy
/// reports the same situation as [`SubmitError::SaveFailed`] instead.
#[derive(Debug)]
pub enum Submission {
    Saved {
        application_id: String,
        prediction: PredictionResult,
    },
    PredictedUnsaved {
        prediction: PredictionResult,
        save_error: StoreError,
    },
}

impl Submission {
    pub fn prediction(&self) -> &PredictionResult {
        match self {
            Self::Saved { prediction, .. } | Self::PredictedUnsaved { prediction, .. } => {
                prediction
            }
        }
    }
}

/// Orchestrates the loan-application lifecycle against the prediction
/// service and the document store.
pub struct ApplicationWorkflow {
    predictor: Arc<dyn PredictionService>,
    store: Arc<dyn DocumentStore>,
    config: AppConfig,
}

impl ApplicationWorkflow {
    pub fn new(
        predictor: Arc<dyn PredictionService>,
        store: Arc<dyn DocumentStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            predictor,
            store,
            config,
        }
    }

    /// Submit a loan application.
    ///
    /// validate → build allow-listed payload → remote prediction →
    /// derive status → persist. Validation failures abort before any
    /// network call; a save failure after a successful prediction is
    /// surfaced per the configured policy, never silently collapsed.
    pub async fn submit(
        &self,
        session: &SessionContext,
        form: &LoanForm,
    ) -> Result<Submission, SubmitError> {
        let user = session.require().map_err(|_| SubmitError::NotSignedIn)?;
        let validated = form.validate()?;

        let payload = PredictionPayload::from_validated(&validated, self.config.prediction.contract);
        let prediction = self.predictor.predict(&payload).await?;

        let status = ApplicationStatus::from_risk(prediction.risk_score, &self.config.risk_bands);
        let record = build_record(&user.uid, &validated, prediction.clone(), status);

        match self.store.insert_application(&record).await {
            Ok(application_id) => {
                info!(
                    application_id = %application_id,
                    status = %status,
                    risk_score = prediction.risk_score,
                    "Application saved"
                );
                let mut prediction = prediction;
                prediction.application_id = application_id.clone();
                Ok(Submission::Saved {
                    application_id,
                    prediction,
                })
            }
            Err(save_error) => {
                warn!(error = %save_error, "Prediction succeeded but save failed");
                match self.config.save_failure_policy {
                    SaveFailurePolicy::SurfacePrediction => Ok(Submission::PredictedUnsaved {
                        prediction,
                        save_error,
                    }),
                    SaveFailurePolicy::FailSubmission => Err(SubmitError::SaveFailed {
                        prediction: Box::new(prediction),
                        source: save_error,
                    }),
                }
            }
        }
    }

    /// Single-record lookup. Not-found is `Ok(None)`, not an error.
    pub async fn get_application(
        &self,
        id: &str,
    ) -> Result<Option<LoanApplication>, StoreError> {
        self.store.get_application(id).await
    }

    /// All applications owned by `user_id`, newest first. A fresh call
    /// re-fetches in full; there is no cursor.
    pub async fn list_applications(
        &self,
        user_id: &str,
    ) -> Result<Vec<LoanApplication>, StoreError> {
        self.store.list_applications(user_id).await
    }

    /// Delete by identifier. Idempotent from the caller's perspective:
    /// the store may report a missing id, but deleting something already
    /// gone is not a failure of intent, so `NotFound` normalizes to
    /// success.
    pub async fn delete_application(&self, id: &str) -> Result<(), StoreError> {
        match self.store.delete_application(id).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => {
                debug!(id, "Delete of missing application treated as success");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

fn build_record(
    user_id: &str,
    validated: &ValidatedApplication,
    prediction: PredictionResult,
    status: ApplicationStatus,
) -> LoanApplication {
    LoanApplication {
        user_id: user_id.to_string(),
        // Assigned by the store on insert.
        application_id: String::new(),
        name: validated.name.clone(),
        email: validated.email.clone(),
        age: validated.age,
        education: validated.education,
        income: validated.income,
        marital_status: validated.marital_status,
        has_dependents: validated.has_dependents,
        has_co_signer: validated.has_co_signer,
        has_mortgage: validated.has_mortgage,
        employment_status: validated.employment_status,
        employment_type: validated.employment_type,
        home_ownership: validated.home_ownership,
        credit_score: validated.credit_score,
        loan_amount: validated.loan_amount,
        loan_purpose: validated.loan_purpose,
        loan_term_months: validated.loan_term_months,
        interest_rate: validated.interest_rate,
        months_employed: validated.months_employed,
        num_credit_lines: validated.num_credit_lines,
        prediction: Some(prediction),
        submitted_at: Utc::now(),
        status,
    }
}
