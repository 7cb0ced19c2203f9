//! HTTP client for the remote default-risk model service.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::application::model::PredictionResult;
use crate::config::PredictionConfig;
use crate::error::PredictionError;
use crate::predict::payload::PredictionPayload;

/// Boundary trait for the prediction service — the one true wire protocol
/// in the system. Implemented by [`HttpPredictionClient`] in production and
/// by in-memory fakes in tests.
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Score a feature payload. One POST, no retries; every failure is
    /// terminal for the calling chain.
    async fn predict(
        &self,
        payload: &PredictionPayload,
    ) -> Result<PredictionResult, PredictionError>;

    /// Service liveness probe.
    async fn health(&self) -> Result<(), PredictionError>;
}

/// Error body shape the service uses for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// reqwest-backed prediction client.
pub struct HttpPredictionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPredictionClient {
    /// Build a client with the configured request timeout.
    pub fn new(config: &PredictionConfig) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PredictionError::Unreachable(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Map a non-2xx response into an API error, pulling the `detail`
    /// field out of the JSON body when present.
    async fn api_error(response: reqwest::Response) -> PredictionError {
        let status = response.status().as_u16();
        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail.unwrap_or_else(|| "no detail provided".into()),
            Err(_) => "no detail provided".into(),
        };
        warn!(status, detail = %detail, "Prediction service rejected the request");
        PredictionError::Api { status, detail }
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(
        &self,
        payload: &PredictionPayload,
    ) -> Result<PredictionResult, PredictionError> {
        let url = format!("{}/predict", self.base_url);
        debug!(url = %url, "Requesting prediction");

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| PredictionError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let mut result: PredictionResult = response
            .json()
            .await
            .map_err(|e| PredictionError::InvalidResponse(e.to_string()))?;

        // The service owns the score; clamping only guards against a
        // misbehaving model leaking out-of-range values into derivations.
        if !(0.0..=1.0).contains(&result.risk_score) {
            warn!(
                risk_score = result.risk_score,
                "Risk score outside [0,1], clamping"
            );
            result.risk_score = result.risk_score.clamp(0.0, 1.0);
        }

        info!(
            prediction = %result.model_prediction,
            risk_score = result.risk_score,
            "Prediction received"
        );
        Ok(result)
    }

    async fn health(&self) -> Result<(), PredictionError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PredictionError::Unreachable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::PayloadContract;

    #[test]
    fn client_strips_trailing_slash_from_base_url() {
        let config = PredictionConfig {
            base_url: "http://localhost:8000/".into(),
            timeout: Duration::from_secs(30),
            contract: PayloadContract::V2,
        };
        let client = HttpPredictionClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
