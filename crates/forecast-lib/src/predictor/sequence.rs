//! Sequence predictor: seven-day window in, next-day temperature out
//!
//! Runs linearly: validate window, scale each day with the training-time
//! scaler, stack days oldest first into a `(1, 7, 6)` input, run the model,
//! inverse-scale its single output through the temperature column, round.

use super::{FeatureExtractor, OutputFormatter, SequenceModel};
use crate::artifacts;
use crate::error::Result;
use crate::models::{PredictionResult, Window};
use crate::scaler::MinMaxScaler;
use crate::schema::SEQUENCE_TARGET;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

pub struct SequencePredictor {
    model: Box<dyn SequenceModel>,
    scaler: MinMaxScaler,
    formatter: OutputFormatter,
}

impl SequencePredictor {
    /// The scaler must be the one fitted alongside the model
    pub fn new(model: Box<dyn SequenceModel>, scaler: MinMaxScaler) -> Self {
        Self {
            model,
            scaler,
            formatter: OutputFormatter::new(),
        }
    }

    /// Load scaler and model, checking the scaler's recorded model digest
    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self> {
        let scaler = artifacts::load_scaler(scaler_path)?;
        let model = artifacts::load_sequence_model(model_path)?;
        artifacts::verify_pairing(&scaler, model_path)?;
        Ok(Self::new(model, scaler))
    }

    pub fn family(&self) -> &'static str {
        self.model.family()
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    pub fn predict(&self, window: &Window) -> Result<PredictionResult> {
        let input = FeatureExtractor::scaled(&self.scaler).extract_window(window);
        let scaled = self.model.predict(&input)?;
        let temperature = self.scaler.inverse_column(SEQUENCE_TARGET, scaled);
        debug!(scaled, temperature, "Inverse-scaled sequence output");
        self.formatter.sequence(temperature)
    }

    /// Parse a JSON array of seven observations and predict
    pub fn predict_json(&self, input: &str) -> Result<PredictionResult> {
        let value: Value = serde_json::from_str(input)?;
        self.predict(&Window::from_value(&value)?)
    }
}
