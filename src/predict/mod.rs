//! Remote prediction service boundary — payload contract and HTTP client.

pub mod client;
pub mod payload;

pub use client::{HttpPredictionClient, PredictionService};
pub use payload::PredictionPayload;
