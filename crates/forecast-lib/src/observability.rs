//! Structured logging for forecast invocations
//!
//! Events go through `tracing` with a fixed `event` field so the caller's
//! log shipper can filter them. The subscriber is installed by the binary
//! and writes to stderr; stdout is reserved for the prediction itself.

use crate::artifacts::ArtifactInfo;
use crate::error::ForecastError;
use crate::models::PredictionResult;
use std::time::Duration;
use tracing::{debug, info};

/// Structured logger for one invocation
///
/// Provides consistent JSON-formatted logging for artifact loads,
/// predictions and failures.
#[derive(Clone)]
pub struct StructuredLogger {
    predictor: &'static str,
}

impl StructuredLogger {
    pub fn new(predictor: &'static str) -> Self {
        Self { predictor }
    }

    pub fn predictor(&self) -> &'static str {
        self.predictor
    }

    /// Log a successfully loaded artifact
    pub fn log_artifact_loaded(&self, artifact: &ArtifactInfo) {
        info!(
            event = "artifact_loaded",
            predictor = %self.predictor,
            kind = %artifact.kind,
            family = %artifact.family,
            path = %artifact.path.display(),
            sha256 = %artifact.sha256,
            "Artifact loaded"
        );
    }

    /// Log a prediction about to be written to stdout
    pub fn log_prediction(&self, result: &PredictionResult, family: &str, elapsed: Duration) {
        info!(
            event = "prediction_generated",
            predictor = %self.predictor,
            family = %family,
            temperatura_predicha = result.temperatura_predicha,
            lluvia_predicha = ?result.lluvia_predicha,
            elapsed_us = elapsed.as_micros() as u64,
            "Generated weather prediction"
        );
    }

    /// Log a fatal failure; the process exits right after.
    ///
    /// Kept at debug: the binary already prints the failure as one plain
    /// line on stderr.
    pub fn log_failure(&self, err: &ForecastError) {
        debug!(
            event = "prediction_failed",
            predictor = %self.predictor,
            kind = %err.kind(),
            exit_code = err.exit_code(),
            error = %err,
            "Prediction failed"
        );
    }
}
