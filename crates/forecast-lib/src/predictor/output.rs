//! Prediction output formatting and post-processing
//!
//! Turns raw model values into the stable JSON contract: fixed field
//! names, two decimal places, and never a NaN or infinity.

use crate::error::{ForecastError, Result};
use crate::models::PredictionResult;

/// Decimal places kept in emitted predictions
pub const OUTPUT_DECIMALS: u32 = 2;

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Decimal places kept after rounding (default: 2)
    pub decimals: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            decimals: OUTPUT_DECIMALS,
        }
    }
}

/// Round to a fixed number of decimals.
///
/// Rounds the exact binary value, so `2.675` (stored just below the tie)
/// gives `2.67`, and only exact ties such as `0.125` go to the even digit.
/// Scaling by a power of ten first would perturb both cases.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Formats raw model outputs into a PredictionResult
pub struct OutputFormatter {
    config: OutputConfig,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self {
            config: OutputConfig::default(),
        }
    }

    pub fn with_config(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Format the point model's `[temperatura, lluvia]` pair
    pub fn point(&self, raw: [f64; 2]) -> Result<PredictionResult> {
        Ok(PredictionResult {
            temperatura_predicha: self.finite(raw[0], "temperature")?,
            lluvia_predicha: Some(self.finite(raw[1], "rainfall")?),
        })
    }

    /// Format the sequence model's inverse-scaled temperature
    pub fn sequence(&self, temperature: f64) -> Result<PredictionResult> {
        Ok(PredictionResult {
            temperatura_predicha: self.finite(temperature, "temperature")?,
            lluvia_predicha: None,
        })
    }

    fn finite(&self, value: f64, what: &'static str) -> Result<f64> {
        let rounded = round_to(value, self.config.decimals);
        if rounded.is_finite() {
            Ok(rounded)
        } else {
            Err(ForecastError::InvalidOutput(what))
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}
