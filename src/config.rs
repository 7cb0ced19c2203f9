//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Risk-score cut points for deriving an application status.
///
/// These are configuration, not constants inferred from data: `risk <
/// approve_below` → approved, `risk < reject_from` → pending, else
/// rejected. Both must lie in [0,1] with `approve_below <= reject_from`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskBands {
    pub approve_below: f64,
    pub reject_from: f64,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            approve_below: 0.3,
            reject_from: 0.7,
        }
    }
}

impl RiskBands {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.approve_below) || !in_unit(self.reject_from) {
            return Err(ConfigError::InvalidValue {
                key: "risk_bands".into(),
                message: "cut points must lie in [0,1]".into(),
            });
        }
        if self.approve_below > self.reject_from {
            return Err(ConfigError::InvalidValue {
                key: "risk_bands".into(),
                message: "approve_below must not exceed reject_from".into(),
            });
        }
        Ok(())
    }
}

/// Which field set the prediction payload carries.
///
/// The allow-listed payload is a versioned contract: V1 omits `name`,
/// `email`, and `employmentType`; V2 includes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadContract {
    V1,
    #[default]
    V2,
}

/// What to do when the remote prediction succeeded but persisting the
/// combined record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveFailurePolicy {
    /// Return the prediction to the caller anyway, flagged as unsaved.
    #[default]
    SurfacePrediction,
    /// Treat the whole submission as failed (the error still carries the
    /// prediction).
    FailSubmission,
}

/// Prediction-service endpoint configuration.
#[derive(Debug, Clone)]
pub struct PredictionConfig {
    /// Base URL of the model service, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Request timeout for calls to the model service.
    pub timeout: Duration,
    /// Payload field-set version.
    pub contract: PayloadContract,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(30),
            contract: PayloadContract::default(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub prediction: PredictionConfig,
    pub risk_bands: RiskBands,
    pub save_failure_policy: SaveFailurePolicy,
}

impl AppConfig {
    /// Build configuration from `LOAN_DESK_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("LOAN_DESK_API_URL") {
            config.prediction.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(secs) = std::env::var("LOAN_DESK_PREDICT_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| ConfigError::InvalidValue {
                key: "LOAN_DESK_PREDICT_TIMEOUT_SECS".into(),
                message: format!("not a number: {secs}"),
            })?;
            config.prediction.timeout = Duration::from_secs(secs);
        }
        if let Ok(v) = std::env::var("LOAN_DESK_PAYLOAD_CONTRACT") {
            config.prediction.contract = match v.as_str() {
                "v1" => PayloadContract::V1,
                "v2" => PayloadContract::V2,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "LOAN_DESK_PAYLOAD_CONTRACT".into(),
                        message: format!("expected v1 or v2, got {other}"),
                    });
                }
            };
        }
        if let Ok(v) = std::env::var("LOAN_DESK_APPROVE_BELOW") {
            config.risk_bands.approve_below =
                v.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "LOAN_DESK_APPROVE_BELOW".into(),
                    message: format!("not a number: {v}"),
                })?;
        }
        if let Ok(v) = std::env::var("LOAN_DESK_REJECT_FROM") {
            config.risk_bands.reject_from =
                v.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "LOAN_DESK_REJECT_FROM".into(),
                    message: format!("not a number: {v}"),
                })?;
        }
        if let Ok(v) = std::env::var("LOAN_DESK_ON_SAVE_FAILURE") {
            config.save_failure_policy = match v.as_str() {
                "surface" => SaveFailurePolicy::SurfacePrediction,
                "fail" => SaveFailurePolicy::FailSubmission,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "LOAN_DESK_ON_SAVE_FAILURE".into(),
                        message: format!("expected surface or fail, got {other}"),
                    });
                }
            };
        }

        config.risk_bands.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_are_the_documented_cut_points() {
        let bands = RiskBands::default();
        assert_eq!(bands.approve_below, 0.3);
        assert_eq!(bands.reject_from, 0.7);
        assert!(bands.validate().is_ok());
    }

    #[test]
    fn inverted_bands_rejected() {
        let bands = RiskBands {
            approve_below: 0.8,
            reject_from: 0.2,
        };
        assert!(bands.validate().is_err());
    }

    #[test]
    fn out_of_unit_bands_rejected() {
        let bands = RiskBands {
            approve_below: -0.1,
            reject_from: 0.7,
        };
        assert!(bands.validate().is_err());

        let bands = RiskBands {
            approve_below: 0.3,
            reject_from: 1.5,
        };
        assert!(bands.validate().is_err());
    }

    #[test]
    fn default_policy_surfaces_prediction() {
        assert_eq!(
            SaveFailurePolicy::default(),
            SaveFailurePolicy::SurfacePrediction
        );
        assert_eq!(PayloadContract::default(), PayloadContract::V2);
    }
}
