//! End-to-end submission flow: session guard → validate → mocked model
//! service → persistence → history.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use loan_desk::application::form::LoanForm;
use loan_desk::application::model::ApplicationStatus;
use loan_desk::application::workflow::{ApplicationWorkflow, Submission};
use loan_desk::auth::{IdentityProvider, MemoryIdentityProvider};
use loan_desk::config::{AppConfig, PayloadContract, PredictionConfig};
use loan_desk::error::SubmitError;
use loan_desk::predict::HttpPredictionClient;
use loan_desk::session::{Navigator, Route, SessionContext, SessionGuard};
use loan_desk::store::{DocumentStore, MemoryStore};

struct NullNavigator;

impl Navigator for NullNavigator {
    fn navigate(&self, _route: Route) {}
}

fn valid_form() -> LoanForm {
    serde_json::from_value(serde_json::json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "age": "36",
        "income": "85000",
        "education": "Master's",
        "maritalStatus": "Married",
        "hasDependents": "Yes",
        "hasCoSigner": "No",
        "hasMortgage": "Yes",
        "employmentStatus": "Employed",
        "employmentType": "Full-time",
        "homeOwnership": "Mortgage",
        "creditScore": "710",
        "loanAmount": "25000",
        "loanPurpose": "Auto",
        "loanTerm": "36",
        "interestRate": "7.5",
        "monthsEmployed": "48",
        "numCreditLines": "4"
    }))
    .unwrap()
}

async fn mount_prediction(server: &MockServer, risk_score: f64, label: &str) {
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "modelPrediction": label,
            "riskScore": risk_score,
            "confidence": 0.9,
            "modelPredictions": { "defaultRisk": risk_score, "average": risk_score }
        })))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        prediction: PredictionConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            contract: PayloadContract::V2,
        },
        ..Default::default()
    }
}

/// Sign a user in through the real guard and wait for the context to
/// catch the emission.
async fn guarded_session(provider: &MemoryIdentityProvider) -> (SessionContext, SessionGuard) {
    let context = SessionContext::new();
    let guard = SessionGuard::spawn(provider, context.clone(), Arc::new(NullNavigator));

    provider.seed_account("ada@example.com", SecretString::from("pw"), true);
    provider
        .sign_in("ada@example.com", SecretString::from("pw"))
        .await
        .unwrap();

    for _ in 0..200 {
        if context.user_id().is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(context.user_id().is_some(), "guard never saw the sign-in");
    (context, guard)
}

#[tokio::test]
async fn low_risk_submission_lands_approved_in_history() {
    let server = MockServer::start().await;
    mount_prediction(&server, 0.12, "No Default").await;

    let provider = MemoryIdentityProvider::new();
    let (session, _guard) = guarded_session(&provider).await;
    let uid = session.user_id().unwrap();

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let predictor = Arc::new(HttpPredictionClient::new(&config_for(&server).prediction).unwrap());
    let workflow = ApplicationWorkflow::new(predictor, store, config_for(&server));

    let Submission::Saved {
        application_id,
        prediction,
    } = workflow.submit(&session, &valid_form()).await.unwrap()
    else {
        panic!("expected a saved submission");
    };
    assert_eq!(prediction.application_id, application_id);

    let stored = workflow
        .get_application(&application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ApplicationStatus::Approved);
    assert!(stored.is_approved());
    assert_eq!(stored.user_id, uid);

    let history = workflow.list_applications(&uid).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].application_id, application_id);
}

#[tokio::test]
async fn high_risk_submission_is_rejected() {
    let server = MockServer::start().await;
    mount_prediction(&server, 0.84, "Default").await;

    let provider = MemoryIdentityProvider::new();
    let (session, _guard) = guarded_session(&provider).await;

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let predictor = Arc::new(HttpPredictionClient::new(&config_for(&server).prediction).unwrap());
    let workflow = ApplicationWorkflow::new(predictor, store, config_for(&server));

    let Submission::Saved { application_id, .. } =
        workflow.submit(&session, &valid_form()).await.unwrap()
    else {
        panic!("expected saved");
    };
    let stored = workflow
        .get_application(&application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ApplicationStatus::Rejected);
    assert!(!stored.is_approved());
}

#[tokio::test]
async fn invalid_form_never_reaches_the_service() {
    let server = MockServer::start().await;
    mount_prediction(&server, 0.12, "No Default").await;

    let provider = MemoryIdentityProvider::new();
    let (session, _guard) = guarded_session(&provider).await;

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let predictor = Arc::new(HttpPredictionClient::new(&config_for(&server).prediction).unwrap());
    let workflow = ApplicationWorkflow::new(predictor, store, config_for(&server));

    let mut form = valid_form();
    form.credit_score = "851".into();
    let err = workflow.submit(&session, &form).await.unwrap_err();

    let SubmitError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    assert!(errors.message_for("creditScore").is_some());
    // Every field marked touched for the UI.
    assert!(errors.touched.contains(&"loanPurpose"));
    // No request crossed the wire.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn sign_out_mid_session_blocks_further_submissions() {
    let server = MockServer::start().await;
    mount_prediction(&server, 0.12, "No Default").await;

    let provider = MemoryIdentityProvider::new();
    let (session, _guard) = guarded_session(&provider).await;

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let predictor = Arc::new(HttpPredictionClient::new(&config_for(&server).prediction).unwrap());
    let workflow = ApplicationWorkflow::new(predictor, store, config_for(&server));

    provider.sign_out().await.unwrap();
    for _ in 0..200 {
        if session.current().is_none() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let err = workflow.submit(&session, &valid_form()).await.unwrap_err();
    assert!(matches!(err, SubmitError::NotSignedIn));
}
