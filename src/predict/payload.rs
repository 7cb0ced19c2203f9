//! Feature payload for the prediction service.
//!
//! An explicit allow-list built from a validated form — never the raw form
//! object, since extra or renamed fields would break the remote contract.
//! The field set is a versioned contract: V1 omits `name`, `email`, and
//! `employmentType`; V2 carries them.

use serde::Serialize;

use crate::application::form::ValidatedApplication;
use crate::application::model::{
    Education, EmploymentStatus, EmploymentType, HomeOwnership, LoanPurpose, MaritalStatus, YesNo,
};
use crate::config::PayloadContract;

/// The exact JSON body sent to `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub age: u32,
    pub income: f64,
    pub education: Education,
    pub marital_status: MaritalStatus,
    pub has_dependents: YesNo,
    pub has_co_signer: YesNo,
    pub has_mortgage: YesNo,
    pub employment_status: EmploymentStatus,
    pub credit_score: u32,
    pub loan_amount: f64,
    pub loan_purpose: LoanPurpose,
    #[serde(rename = "loanTerm")]
    pub loan_term: u32,
    pub interest_rate: f64,
    pub months_employed: u32,
    pub num_credit_lines: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<EmploymentType>,
    pub home_ownership: HomeOwnership,
}

impl PredictionPayload {
    /// Build the payload for the given contract version from a validated
    /// application.
    pub fn from_validated(app: &ValidatedApplication, contract: PayloadContract) -> Self {
        let v2 = contract == PayloadContract::V2;
        Self {
            name: v2.then(|| app.name.clone()),
            email: v2.then(|| app.email.clone()),
            age: app.age,
            income: app.income,
            education: app.education,
            marital_status: app.marital_status,
            has_dependents: app.has_dependents,
            has_co_signer: app.has_co_signer,
            has_mortgage: app.has_mortgage,
            employment_status: app.employment_status,
            credit_score: app.credit_score,
            loan_amount: app.loan_amount,
            loan_purpose: app.loan_purpose,
            loan_term: app.loan_term_months,
            interest_rate: app.interest_rate,
            months_employed: app.months_employed,
            num_credit_lines: app.num_credit_lines,
            employment_type: v2.then_some(app.employment_type),
            home_ownership: app.home_ownership,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::form::tests::valid_form;

    const V1_FIELDS: &[&str] = &[
        "age",
        "income",
        "education",
        "maritalStatus",
        "hasDependents",
        "hasCoSigner",
        "hasMortgage",
        "employmentStatus",
        "creditScore",
        "loanAmount",
        "loanPurpose",
        "loanTerm",
        "interestRate",
        "monthsEmployed",
        "numCreditLines",
        "homeOwnership",
    ];

    fn keys(payload: &PredictionPayload) -> Vec<String> {
        let value = serde_json::to_value(payload).unwrap();
        value.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn v2_carries_the_full_allow_list() {
        let app = valid_form().validate().unwrap();
        let payload = PredictionPayload::from_validated(&app, PayloadContract::V2);
        let keys = keys(&payload);

        for field in V1_FIELDS {
            assert!(keys.iter().any(|k| k == field), "missing {field}");
        }
        for field in ["name", "email", "employmentType"] {
            assert!(keys.iter().any(|k| k == field), "missing {field}");
        }
        assert_eq!(keys.len(), V1_FIELDS.len() + 3);
    }

    #[test]
    fn v1_omits_the_versioned_fields() {
        let app = valid_form().validate().unwrap();
        let payload = PredictionPayload::from_validated(&app, PayloadContract::V1);
        let keys = keys(&payload);

        assert_eq!(keys.len(), V1_FIELDS.len());
        for field in ["name", "email", "employmentType"] {
            assert!(!keys.iter().any(|k| k == field), "unexpected {field}");
        }
    }

    #[test]
    fn payload_never_leaks_non_feature_fields() {
        let app = valid_form().validate().unwrap();
        let payload = PredictionPayload::from_validated(&app, PayloadContract::V2);
        let value = serde_json::to_value(&payload).unwrap();
        let obj = value.as_object().unwrap();

        for forbidden in ["userId", "applicationId", "status", "submittedAt", "prediction"] {
            assert!(!obj.contains_key(forbidden), "leaked {forbidden}");
        }
    }

    #[test]
    fn payload_values_use_wire_strings() {
        let app = valid_form().validate().unwrap();
        let payload = PredictionPayload::from_validated(&app, PayloadContract::V2);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["education"], "Master's");
        assert_eq!(value["employmentType"], "Full-time");
        assert_eq!(value["hasDependents"], "Yes");
        assert_eq!(value["loanTerm"], 36);
    }
}
