//! Error taxonomy for a single forecast invocation
//!
//! Every failure is fatal for the invocation: nothing is retried and no
//! fallback model exists. The binary maps each category to a distinct
//! process exit code so the caller can tell "no prediction" apart from
//! "a prediction" by exit status alone.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// Model or scaler file absent
    #[error("artifact not found: {}", path.display())]
    ArtifactMissing { path: PathBuf },

    /// Artifact present but unreadable or structurally wrong
    #[error("invalid artifact {}: {reason}", path.display())]
    ArtifactInvalid { path: PathBuf, reason: String },

    /// Scaler and sequence model do not come from the same training run
    #[error("scaler expects model digest {expected}, but {} has {actual}", model.display())]
    ArtifactMismatch {
        model: PathBuf,
        expected: String,
        actual: String,
    },

    /// Declared column names disagree with the feature schema
    #[error("column order mismatch: expected [{expected}], artifact declares [{actual}]")]
    SchemaMismatch { expected: String, actual: String },

    /// Input JSON unparsable or missing required fields
    #[error("malformed input: {0}")]
    InputMalformed(String),

    /// Window length or feature count differs from what the model was trained on
    #[error("shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),

    /// Model produced NaN or infinity
    #[error("model produced a non-finite {0}")]
    InvalidOutput(&'static str),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForecastError {
    pub fn invalid_artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactInvalid {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-friendly category name, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArtifactMissing { .. } => "artifact_missing",
            Self::ArtifactInvalid { .. } => "artifact_invalid",
            Self::ArtifactMismatch { .. } => "artifact_mismatch",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::InputMalformed(_) => "input_malformed",
            Self::ShapeMismatch { .. } => "shape_mismatch",
            Self::Inference(_) => "inference",
            Self::InvalidOutput(_) => "invalid_output",
            Self::Io(_) => "io",
        }
    }

    /// Process exit code for this failure category
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InputMalformed(_) => 2,
            Self::ArtifactMissing { .. }
            | Self::ArtifactInvalid { .. }
            | Self::ArtifactMismatch { .. }
            | Self::SchemaMismatch { .. } => 3,
            Self::ShapeMismatch { .. } => 4,
            Self::Inference(_) | Self::InvalidOutput(_) | Self::Io(_) => 1,
        }
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        Self::InputMalformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_nonzero() {
        let errors = [
            ForecastError::ArtifactMissing {
                path: PathBuf::from("ml/scaler.json"),
            },
            ForecastError::InputMalformed("missing field `humedad`".into()),
            ForecastError::ShapeMismatch {
                what: "window",
                expected: 7,
                actual: 6,
            },
            ForecastError::InvalidOutput("temperature"),
        ];
        for err in &errors {
            assert_ne!(err.exit_code(), 0, "{} must exit nonzero", err.kind());
        }
    }

    #[test]
    fn test_categories_have_distinct_codes() {
        let missing = ForecastError::ArtifactMissing {
            path: PathBuf::from("x"),
        };
        let malformed = ForecastError::InputMalformed("x".into());
        let shape = ForecastError::ShapeMismatch {
            what: "window",
            expected: 7,
            actual: 3,
        };
        assert_eq!(missing.exit_code(), 3);
        assert_eq!(malformed.exit_code(), 2);
        assert_eq!(shape.exit_code(), 4);
    }

    #[test]
    fn test_display_mentions_path() {
        let err = ForecastError::ArtifactMissing {
            path: PathBuf::from("ml/point_model.json"),
        };
        assert!(err.to_string().contains("ml/point_model.json"));
    }

    #[test]
    fn test_json_error_is_malformed_input() {
        let err: ForecastError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "input_malformed");
    }
}
