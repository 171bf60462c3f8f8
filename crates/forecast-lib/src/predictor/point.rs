//! Point predictor: one observation in, temperature and rainfall out

use super::{FeatureExtractor, OutputFormatter, PointModel};
use crate::artifacts;
use crate::error::Result;
use crate::models::{Observation, PredictionResult};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

pub struct PointPredictor {
    model: Box<dyn PointModel>,
    formatter: OutputFormatter,
}

impl PointPredictor {
    pub fn new(model: Box<dyn PointModel>) -> Self {
        Self {
            model,
            formatter: OutputFormatter::new(),
        }
    }

    /// Load the multi-output regressor from disk
    pub fn load(model_path: &Path) -> Result<Self> {
        Ok(Self::new(artifacts::load_point_model(model_path)?))
    }

    pub fn family(&self) -> &'static str {
        self.model.family()
    }

    pub fn predict(&self, observation: &Observation) -> Result<PredictionResult> {
        let features = FeatureExtractor::unscaled().extract(observation);
        let raw = self.model.predict(&features)?;
        debug!(temperatura = raw[0], lluvia = raw[1], "Raw point model output");
        self.formatter.point(raw)
    }

    /// Parse a flat JSON observation and predict
    pub fn predict_json(&self, input: &str) -> Result<PredictionResult> {
        let value: Value = serde_json::from_str(input)?;
        self.predict(&Observation::from_value(&value)?)
    }
}
