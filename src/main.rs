use std::sync::Arc;

use secrecy::SecretString;
use tracing::info;

use loan_desk::application::form::LoanForm;
use loan_desk::application::workflow::{ApplicationWorkflow, Submission};
use loan_desk::auth::{IdentityProvider, MemoryIdentityProvider};
use loan_desk::blob::MemoryBlobStore;
use loan_desk::config::AppConfig;
use loan_desk::error::SubmitError;
use loan_desk::predict::{HttpPredictionClient, PredictionService};
use loan_desk::profile::ProfileWorkflow;
use loan_desk::session::{Navigator, Route, SessionContext, SessionGuard};
use loan_desk::store::{DocumentStore, LibSqlStore};

/// Logs navigation requests instead of rendering anything.
struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: Route) {
        info!(route = %route, "Navigation requested");
    }
}

fn usage() -> ! {
    eprintln!("Usage: loan-desk <command>");
    eprintln!("  health            check the prediction service");
    eprintln!("  submit <form.json> validate, score, and save an application");
    eprintln!("  history           list this user's applications, newest first");
    eprintln!("  show <id>         print one application");
    eprintln!("  delete <id>       delete one application");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    let db_path =
        std::env::var("LOAN_DESK_DB_PATH").unwrap_or_else(|_| "./data/loan-desk.db".to_string());
    let store: Arc<dyn DocumentStore> =
        Arc::new(LibSqlStore::new_local(std::path::Path::new(&db_path)).await?);

    let predictor = Arc::new(HttpPredictionClient::new(&config.prediction)?);

    // Local identity for the harness — the portal's real identity provider
    // is an external service and not part of this binary.
    let email =
        std::env::var("LOAN_DESK_USER").unwrap_or_else(|_| "demo@loan-desk.local".to_string());
    let password = SecretString::from(
        std::env::var("LOAN_DESK_PASSWORD").unwrap_or_else(|_| "demo".to_string()),
    );
    let identity = Arc::new(MemoryIdentityProvider::new());
    identity.seed_account(&email, password.clone(), true);

    let session = SessionContext::new();
    let _guard = SessionGuard::spawn(identity.as_ref(), session.clone(), Arc::new(LoggingNavigator));
    let user = identity.sign_in(&email, password).await?;

    let applications = ApplicationWorkflow::new(predictor.clone(), store.clone(), config.clone());
    let profiles = ProfileWorkflow::new(
        store.clone(),
        Arc::new(MemoryBlobStore::new()),
        identity.clone(),
    );
    // Ensure the profile document exists for this identity.
    let profile = profiles.load_profile(&user.uid).await?;
    info!(uid = %user.uid, email = %profile.email.unwrap_or_default(), "Session ready");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("health") => {
            predictor.health().await?;
            println!("Prediction service is up at {}", config.prediction.base_url);
        }
        Some("submit") => {
            let Some(path) = args.get(1) else { usage() };
            let raw = std::fs::read_to_string(path)?;
            let form: LoanForm = serde_json::from_str(&raw)?;

            match applications.submit(&session, &form).await {
                Ok(Submission::Saved {
                    application_id,
                    prediction,
                }) => {
                    let level = prediction.risk_level();
                    println!("Application {application_id} saved");
                    println!(
                        "  {} — risk {:.2} ({} / {}), confidence {:.2}",
                        prediction.model_prediction,
                        prediction.risk_score,
                        level,
                        level.color(),
                        prediction.confidence
                    );
                }
                Ok(Submission::PredictedUnsaved {
                    prediction,
                    save_error,
                }) => {
                    println!(
                        "Prediction: {} — risk {:.2} (NOT saved: {save_error})",
                        prediction.model_prediction, prediction.risk_score
                    );
                }
                Err(SubmitError::Validation(errors)) => {
                    eprintln!("Form has {} problem(s):", errors.errors.len());
                    for e in &errors.errors {
                        eprintln!("  {}: {}", e.field, e.message);
                    }
                    std::process::exit(1);
                }
                Err(SubmitError::Prediction(e)) => {
                    eprintln!("{}", e.user_message());
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some("history") => {
            let apps = applications.list_applications(&user.uid).await?;
            if apps.is_empty() {
                println!("No applications yet.");
            }
            for app in apps {
                let risk = app
                    .prediction
                    .as_ref()
                    .map(|p| format!("{:.2}", p.risk_score))
                    .unwrap_or_else(|| "-".into());
                println!(
                    "{}  {}  {}  risk {}  {}",
                    app.submitted_at.format("%Y-%m-%d %H:%M"),
                    app.application_id,
                    app.status,
                    risk,
                    app.loan_purpose
                );
            }
        }
        Some("show") => {
            let Some(id) = args.get(1) else { usage() };
            match applications.get_application(id).await? {
                Some(app) => println!("{}", serde_json::to_string_pretty(&app)?),
                None => println!("No application with id {id}"),
            }
        }
        Some("delete") => {
            let Some(id) = args.get(1) else { usage() };
            applications.delete_application(id).await?;
            println!("Deleted {id}");
        }
        _ => usage(),
    }

    Ok(())
}
