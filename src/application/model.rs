//! Loan application data model — records, predictions, and risk derivations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RiskBands;

// ── Categorical fields ──────────────────────────────────────────────
//
// Wire strings match the model's training data exactly; the remote
// service rejects anything else.

/// Yes/no flag serialized as `"Yes"` / `"No"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<bool> for YesNo {
    fn from(v: bool) -> Self {
        if v { Self::Yes } else { Self::No }
    }
}

impl std::fmt::Display for YesNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "Yes"),
            Self::No => write!(f, "No"),
        }
    }
}

impl std::str::FromStr for YesNo {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(Self::Yes),
            "No" => Ok(Self::No),
            _ => Err(format!("Unknown yes/no value: {s}")),
        }
    }
}

/// Highest education level attained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Education {
    #[serde(rename = "High School")]
    HighSchool,
    #[serde(rename = "Bachelor's")]
    Bachelors,
    #[serde(rename = "Master's")]
    Masters,
    #[serde(rename = "PhD")]
    Phd,
}

impl std::fmt::Display for Education {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighSchool => write!(f, "High School"),
            Self::Bachelors => write!(f, "Bachelor's"),
            Self::Masters => write!(f, "Master's"),
            Self::Phd => write!(f, "PhD"),
        }
    }
}

impl std::str::FromStr for Education {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High School" => Ok(Self::HighSchool),
            "Bachelor's" => Ok(Self::Bachelors),
            "Master's" => Ok(Self::Masters),
            "PhD" => Ok(Self::Phd),
            _ => Err(format!("Unknown education level: {s}")),
        }
    }
}

/// Marital status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
}

impl std::fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "Single"),
            Self::Married => write!(f, "Married"),
            Self::Divorced => write!(f, "Divorced"),
        }
    }
}

impl std::str::FromStr for MaritalStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Single" => Ok(Self::Single),
            "Married" => Ok(Self::Married),
            "Divorced" => Ok(Self::Divorced),
            _ => Err(format!("Unknown marital status: {s}")),
        }
    }
}

/// Current employment situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentStatus {
    Employed,
    #[serde(rename = "Self-employed")]
    SelfEmployed,
    Unemployed,
    Retired,
}

impl std::fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Employed => write!(f, "Employed"),
            Self::SelfEmployed => write!(f, "Self-employed"),
            Self::Unemployed => write!(f, "Unemployed"),
            Self::Retired => write!(f, "Retired"),
        }
    }
}

impl std::str::FromStr for EmploymentStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Employed" => Ok(Self::Employed),
            "Self-employed" => Ok(Self::SelfEmployed),
            "Unemployed" => Ok(Self::Unemployed),
            "Retired" => Ok(Self::Retired),
            _ => Err(format!("Unknown employment status: {s}")),
        }
    }
}

/// Contract type of the applicant's employment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Self-employed")]
    SelfEmployed,
    Unemployed,
}

impl std::fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullTime => write!(f, "Full-time"),
            Self::PartTime => write!(f, "Part-time"),
            Self::SelfEmployed => write!(f, "Self-employed"),
            Self::Unemployed => write!(f, "Unemployed"),
        }
    }
}

impl std::str::FromStr for EmploymentType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full-time" => Ok(Self::FullTime),
            "Part-time" => Ok(Self::PartTime),
            "Self-employed" => Ok(Self::SelfEmployed),
            "Unemployed" => Ok(Self::Unemployed),
            _ => Err(format!("Unknown employment type: {s}")),
        }
    }
}

/// Housing situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HomeOwnership {
    Own,
    Rent,
    Mortgage,
    Other,
}

impl std::fmt::Display for HomeOwnership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Own => write!(f, "Own"),
            Self::Rent => write!(f, "Rent"),
            Self::Mortgage => write!(f, "Mortgage"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for HomeOwnership {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Own" => Ok(Self::Own),
            "Rent" => Ok(Self::Rent),
            "Mortgage" => Ok(Self::Mortgage),
            "Other" => Ok(Self::Other),
            _ => Err(format!("Unknown home ownership: {s}")),
        }
    }
}

/// What the loan is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanPurpose {
    Auto,
    Business,
    Education,
    Home,
    Other,
}

impl std::fmt::Display for LoanPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "Auto"),
            Self::Business => write!(f, "Business"),
            Self::Education => write!(f, "Education"),
            Self::Home => write!(f, "Home"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for LoanPurpose {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Auto" => Ok(Self::Auto),
            "Business" => Ok(Self::Business),
            "Education" => Ok(Self::Education),
            "Home" => Ok(Self::Home),
            "Other" => Ok(Self::Other),
            _ => Err(format!("Unknown loan purpose: {s}")),
        }
    }
}

// ── Status and risk derivations ─────────────────────────────────────

/// Derived tri-state status of a persisted application.
///
/// Always computed from the attached prediction's risk score via
/// [`ApplicationStatus::from_risk`] — never set independently by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Derive a status from a risk score using the configured cut points.
    ///
    /// Total over all inputs: anything that falls through both comparisons
    /// (including a NaN that slipped past decoding) lands on `Rejected`.
    pub fn from_risk(risk_score: f64, bands: &RiskBands) -> Self {
        if risk_score < bands.approve_below {
            Self::Approved
        } else if risk_score < bands.reject_from {
            Self::Pending
        } else {
            Self::Rejected
        }
    }

    /// CSS class for status badges.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Approved => "status-approved",
            Self::Pending => "status-pending",
            Self::Rejected => "status-rejected",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown application status: {s}")),
        }
    }
}

/// Display band for a risk score — drives the gauge rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Band a risk score. Total: every score in [0,1] maps to a level,
    /// and anything outside lands on the nearest extreme.
    pub fn from_score(risk_score: f64) -> Self {
        if risk_score < 0.3 {
            Self::Low
        } else if risk_score < 0.7 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// CSS class for the risk badge.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Low => "risk-low",
            Self::Medium => "risk-medium",
            Self::High => "risk-high",
        }
    }

    /// Gauge color for this band.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "#22c55e",
            Self::Medium => "#f59e0b",
            Self::High => "#ef4444",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

// ── Prediction result ───────────────────────────────────────────────

/// Per-sub-model breakdown attached to a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelBreakdown {
    pub default_risk: f64,
    pub average: f64,
}

/// Result of one remote model inference.
///
/// Immutable once attached to an application; always produced by the
/// external service, never computed locally. `application_id` is empty on
/// the wire and stitched in after the record is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    #[serde(default)]
    pub application_id: String,
    /// Two-valued classification label: `"Default"` / `"No Default"`.
    pub model_prediction: String,
    /// Normalized default probability in [0,1]; higher is riskier.
    pub risk_score: f64,
    pub confidence: f64,
    pub model_predictions: ModelBreakdown,
}

impl PredictionResult {
    /// Display band for this prediction's risk score.
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }
}

// ── Loan application record ─────────────────────────────────────────

/// One persisted loan application, owned by a single user identity.
///
/// The document store is the sole source of truth; instances held by the
/// client are transient, request-scoped copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    /// Owning identity reference.
    pub user_id: String,
    /// Store-assigned identifier; empty until the record is persisted.
    #[serde(default)]
    pub application_id: String,

    pub name: String,
    pub email: String,

    pub age: u32,
    pub education: Education,
    pub income: f64,
    pub marital_status: MaritalStatus,
    pub has_dependents: YesNo,
    pub has_co_signer: YesNo,
    pub has_mortgage: YesNo,
    pub employment_status: EmploymentStatus,
    pub employment_type: EmploymentType,
    pub home_ownership: HomeOwnership,
    pub credit_score: u32,
    pub loan_amount: f64,
    pub loan_purpose: LoanPurpose,
    /// Term in months.
    #[serde(rename = "loanTerm")]
    pub loan_term_months: u32,
    pub interest_rate: f64,
    pub months_employed: u32,
    pub num_credit_lines: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResult>,

    /// Store-assigned submission time.
    pub submitted_at: DateTime<Utc>,
    pub status: ApplicationStatus,
}

impl LoanApplication {
    /// Whether the derived status is approved. Agrees with the stored
    /// prediction by construction.
    pub fn is_approved(&self) -> bool {
        self.status == ApplicationStatus::Approved
    }

    /// Display band for the attached prediction, if any.
    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.prediction.as_ref().map(PredictionResult::risk_level)
    }
}
