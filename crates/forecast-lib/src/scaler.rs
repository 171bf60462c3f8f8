//! Fitted min-max scaler
//!
//! Holds the per-column bounds learned at training time and applies the
//! forward transform `(x - min) / (max - min)` (mapped into
//! `feature_range`) and its inverse. Columns never interact: the inverse of
//! one cell depends only on that cell and its column's bounds.

use crate::error::{ForecastError, Result};
use crate::models::Observation;
use crate::schema::{check_feature_names, Feature, FEATURE_COUNT, FEATURE_ORDER};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_feature_range() -> [f64; 2] {
    [0.0, 1.0]
}

/// On-disk representation of a fitted scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub feature_names: Vec<String>,
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: [f64; 2],
    /// SHA-256 of the sequence model file fitted alongside this scaler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_sha256: Option<String>,
}

/// Min-max scaler over the six schema columns
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    data_min: [f64; FEATURE_COUNT],
    data_max: [f64; FEATURE_COUNT],
    feature_range: [f64; 2],
    scale: [f64; FEATURE_COUNT],
    offset: [f64; FEATURE_COUNT],
    model_sha256: Option<String>,
}

impl MinMaxScaler {
    /// Build from explicit per-column bounds
    pub fn new(data_min: [f64; FEATURE_COUNT], data_max: [f64; FEATURE_COUNT]) -> Result<Self> {
        Self::with_range(data_min, data_max, default_feature_range())
    }

    pub fn with_range(
        data_min: [f64; FEATURE_COUNT],
        data_max: [f64; FEATURE_COUNT],
        feature_range: [f64; 2],
    ) -> Result<Self> {
        let [lo, hi] = feature_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(ForecastError::invalid_artifact(
                "<scaler>",
                format!("feature_range must be increasing, got [{}, {}]", lo, hi),
            ));
        }

        let mut scale = [1.0; FEATURE_COUNT];
        let mut offset = [0.0; FEATURE_COUNT];
        for feature in FEATURE_ORDER {
            let i = feature.index();
            let (min, max) = (data_min[i], data_max[i]);
            if !(min.is_finite() && max.is_finite()) || max < min {
                return Err(ForecastError::invalid_artifact(
                    "<scaler>",
                    format!("bad bounds for `{}`: [{}, {}]", feature, min, max),
                ));
            }
            // A constant column keeps unit range instead of dividing by zero
            let range = if max - min == 0.0 { 1.0 } else { max - min };
            scale[i] = (hi - lo) / range;
            offset[i] = lo - min * scale[i];
        }

        Ok(Self {
            data_min,
            data_max,
            feature_range,
            scale,
            offset,
            model_sha256: None,
        })
    }

    /// Learn per-column bounds from observations
    pub fn fit(observations: &[Observation]) -> Result<Self> {
        if observations.is_empty() {
            return Err(ForecastError::ShapeMismatch {
                what: "scaler fit rows",
                expected: 1,
                actual: 0,
            });
        }
        let mut data_min = [f64::INFINITY; FEATURE_COUNT];
        let mut data_max = [f64::NEG_INFINITY; FEATURE_COUNT];
        for obs in observations {
            for (i, &value) in obs.values().iter().enumerate() {
                data_min[i] = data_min[i].min(value);
                data_max[i] = data_max[i].max(value);
            }
        }
        Self::new(data_min, data_max)
    }

    /// Validate and convert a deserialized artifact
    pub fn from_artifact(artifact: ScalerArtifact) -> Result<Self> {
        check_feature_names(&artifact.feature_names)?;
        let data_min = to_columns("data_min", &artifact.data_min)?;
        let data_max = to_columns("data_max", &artifact.data_max)?;
        let mut scaler = Self::with_range(data_min, data_max, artifact.feature_range)?;
        scaler.model_sha256 = artifact.model_sha256.map(|s| s.to_ascii_lowercase());
        Ok(scaler)
    }

    pub fn to_artifact(&self) -> ScalerArtifact {
        ScalerArtifact {
            feature_names: FEATURE_ORDER.iter().map(|f| f.name().to_string()).collect(),
            data_min: self.data_min.to_vec(),
            data_max: self.data_max.to_vec(),
            feature_range: self.feature_range,
            model_sha256: self.model_sha256.clone(),
        }
    }

    /// Read a scaler artifact from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        crate::artifacts::ensure_exists(path)?;
        let bytes = std::fs::read(path)?;
        let artifact: ScalerArtifact = serde_json::from_slice(&bytes)
            .map_err(|e| ForecastError::invalid_artifact(path, e))?;
        Self::from_artifact(artifact).map_err(|e| match e {
            ForecastError::ArtifactInvalid { reason, .. } => {
                ForecastError::invalid_artifact(path, reason)
            }
            other => other,
        })
    }

    /// Recorded digest of the companion sequence model, if any
    pub fn model_sha256(&self) -> Option<&str> {
        self.model_sha256.as_deref()
    }

    pub fn with_model_sha256(mut self, digest: impl Into<String>) -> Self {
        self.model_sha256 = Some(digest.into().to_ascii_lowercase());
        self
    }

    pub fn bounds(&self, feature: Feature) -> (f64, f64) {
        let i = feature.index();
        (self.data_min[i], self.data_max[i])
    }

    pub fn transform(&self, values: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, value) in values.iter().enumerate() {
            out[i] = value * self.scale[i] + self.offset[i];
        }
        out
    }

    pub fn inverse_transform(&self, scaled: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, value) in scaled.iter().enumerate() {
            out[i] = self.inverse_cell(i, *value);
        }
        out
    }

    /// Invert a single scaled value for one column.
    ///
    /// Equivalent to placing `scaled` at the column's index of a full
    /// vector, inverting the vector and reading that cell back, whatever the
    /// other cells hold.
    pub fn inverse_column(&self, feature: Feature, scaled: f64) -> f64 {
        self.inverse_cell(feature.index(), scaled)
    }

    fn inverse_cell(&self, i: usize, scaled: f64) -> f64 {
        (scaled - self.offset[i]) / self.scale[i]
    }
}

fn to_columns(field: &'static str, values: &[f64]) -> Result<[f64; FEATURE_COUNT]> {
    values
        .try_into()
        .map_err(|_| ForecastError::ShapeMismatch {
            what: field,
            expected: FEATURE_COUNT,
            actual: values.len(),
        })
}
