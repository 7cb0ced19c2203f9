//! Loan application form — raw field capture and validation.
//!
//! Validation is entirely local: it runs before any network call and, on
//! failure, marks every field touched so a UI can surface per-field state.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::application::model::{
    Education, EmploymentStatus, EmploymentType, HomeOwnership, LoanPurpose, MaritalStatus, YesNo,
};
use crate::error::{FieldError, ValidationErrors};

/// Smallest loan the form accepts.
pub const MIN_LOAN_AMOUNT: f64 = 500.0;

/// Every field of the form, in display order. Used to mark all fields
/// touched when validation fails.
pub const FORM_FIELDS: &[&str] = &[
    "name",
    "email",
    "age",
    "income",
    "education",
    "maritalStatus",
    "hasDependents",
    "hasCoSigner",
    "hasMortgage",
    "employmentStatus",
    "employmentType",
    "homeOwnership",
    "creditScore",
    "loanAmount",
    "loanPurpose",
    "loanTerm",
    "interestRate",
    "monthsEmployed",
    "numCreditLines",
];

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Raw form values as they arrive from a UI — everything is a string,
/// empty meaning "not filled in".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanForm {
    pub name: String,
    pub email: String,
    pub age: String,
    pub income: String,
    pub education: String,
    pub marital_status: String,
    pub has_dependents: String,
    pub has_co_signer: String,
    pub has_mortgage: String,
    pub employment_status: String,
    pub employment_type: String,
    pub home_ownership: String,
    pub credit_score: String,
    pub loan_amount: String,
    pub loan_purpose: String,
    pub loan_term: String,
    pub interest_rate: String,
    pub months_employed: String,
    pub num_credit_lines: String,
}

/// A form that passed validation — typed, range-checked, membership-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedApplication {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub income: f64,
    pub education: Education,
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
    pub loan_term_months: u32,
    pub interest_rate: f64,
    pub months_employed: u32,
    pub num_credit_lines: u32,
}

impl LoanForm {
    /// Validate every field. Returns the typed application, or the full
    /// error set with all fields marked touched. Never touches the network.
    pub fn validate(&self) -> Result<ValidatedApplication, ValidationErrors> {
        let mut check = Checker::default();

        let name = check.required("name", &self.name).map(str::to_owned);
        let email = check.email("email", &self.email);
        let age = check.int_in_range("age", &self.age, 18, 100, "Age must be between 18 and 100");
        let income = check.number_min_exclusive(
            "income",
            &self.income,
            0.0,
            "Income must be greater than zero",
        );
        let education = check.member::<Education>("education", &self.education);
        let marital_status = check.member::<MaritalStatus>("maritalStatus", &self.marital_status);
        let has_dependents = check.member::<YesNo>("hasDependents", &self.has_dependents);
        let has_co_signer = check.member::<YesNo>("hasCoSigner", &self.has_co_signer);
        let has_mortgage = check.member::<YesNo>("hasMortgage", &self.has_mortgage);
        let employment_status =
            check.member::<EmploymentStatus>("employmentStatus", &self.employment_status);
        let employment_type =
            check.member::<EmploymentType>("employmentType", &self.employment_type);
        let home_ownership = check.member::<HomeOwnership>("homeOwnership", &self.home_ownership);
        let credit_score = check.int_in_range(
            "creditScore",
            &self.credit_score,
            300,
            850,
            "Credit score must be between 300 and 850",
        );
        let loan_amount = check.number_min(
            "loanAmount",
            &self.loan_amount,
            MIN_LOAN_AMOUNT,
            &format!("Loan amount must be at least {MIN_LOAN_AMOUNT}"),
        );
        let loan_purpose = check.member::<LoanPurpose>("loanPurpose", &self.loan_purpose);
        let loan_term_months = check.int_in_range(
            "loanTerm",
            &self.loan_term,
            6,
            360,
            "Loan term must be between 6 and 360 months",
        );
        let interest_rate = check.number_in_range(
            "interestRate",
            &self.interest_rate,
            0.0,
            100.0,
            "Interest rate must be between 0 and 100",
        );
        let months_employed = check.int_in_range(
            "monthsEmployed",
            &self.months_employed,
            0,
            720,
            "Months employed must be between 0 and 720",
        );
        let num_credit_lines = check.int_in_range(
            "numCreditLines",
            &self.num_credit_lines,
            0,
            50,
            "Number of credit lines must be between 0 and 50",
        );

        if !check.errors.is_empty() {
            return Err(ValidationErrors {
                errors: check.errors,
                touched: FORM_FIELDS.to_vec(),
            });
        }

        // All `Some` here — any `None` above produced an error.
        Ok(ValidatedApplication {
            name: name.unwrap(),
            email: email.unwrap(),
            age: age.unwrap(),
            income: income.unwrap(),
            education: education.unwrap(),
            marital_status: marital_status.unwrap(),
            has_dependents: has_dependents.unwrap(),
            has_co_signer: has_co_signer.unwrap(),
            has_mortgage: has_mortgage.unwrap(),
            employment_status: employment_status.unwrap(),
            employment_type: employment_type.unwrap(),
            home_ownership: home_ownership.unwrap(),
            credit_score: credit_score.unwrap(),
            loan_amount: loan_amount.unwrap(),
            loan_purpose: loan_purpose.unwrap(),
            loan_term_months: loan_term_months.unwrap(),
            interest_rate: interest_rate.unwrap(),
            months_employed: months_employed.unwrap(),
            num_credit_lines: num_credit_lines.unwrap(),
        })
    }
}

/// Accumulates field errors while individual checks run.
#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn required<'a>(&mut self, field: &'static str, value: &'a str) -> Option<&'a str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.fail(field, "This field is required");
            None
        } else {
            Some(trimmed)
        }
    }

    fn email(&mut self, field: &'static str, value: &str) -> Option<String> {
        let trimmed = self.required(field, value)?;
        if EMAIL_RE.is_match(trimmed) {
            Some(trimmed.to_owned())
        } else {
            self.fail(field, "Enter a valid email address");
            None
        }
    }

    fn int_in_range(
        &mut self,
        field: &'static str,
        value: &str,
        min: u32,
        max: u32,
        message: &str,
    ) -> Option<u32> {
        let trimmed = self.required(field, value)?;
        match trimmed.parse::<u32>() {
            Ok(n) if (min..=max).contains(&n) => Some(n),
            Ok(_) => {
                self.fail(field, message);
                None
            }
            Err(_) => {
                self.fail(field, "Enter a whole number");
                None
            }
        }
    }

    fn parse_number(&mut self, field: &'static str, value: &str) -> Option<f64> {
        let trimmed = self.required(field, value)?;
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(n),
            _ => {
                self.fail(field, "Enter a number");
                None
            }
        }
    }

    fn number_min(
        &mut self,
        field: &'static str,
        value: &str,
        min: f64,
        message: &str,
    ) -> Option<f64> {
        let n = self.parse_number(field, value)?;
        if n >= min {
            Some(n)
        } else {
            self.fail(field, message);
            None
        }
    }

    fn number_min_exclusive(
        &mut self,
        field: &'static str,
        value: &str,
        min: f64,
        message: &str,
    ) -> Option<f64> {
        let n = self.parse_number(field, value)?;
        if n > min {
            Some(n)
        } else {
            self.fail(field, message);
            None
        }
    }

    fn number_in_range(
        &mut self,
        field: &'static str,
        value: &str,
        min: f64,
        max: f64,
        message: &str,
    ) -> Option<f64> {
        let n = self.parse_number(field, value)?;
        if (min..=max).contains(&n) {
            Some(n)
        } else {
            self.fail(field, message);
            None
        }
    }

    fn member<T: FromStr>(&mut self, field: &'static str, value: &str) -> Option<T>
    where
        T::Err: std::fmt::Display,
    {
        let trimmed = self.required(field, value)?;
        match trimmed.parse::<T>() {
            Ok(v) => Some(v),
            Err(e) => {
                self.fail(field, e.to_string());
                None
            }
        }
    }
}
