//! ML prediction engine
//!
//! Two inference paths share the same shape: extract features, run a
//! model, shape the output. The point path feeds one unscaled observation
//! to a multi-output regressor; the sequence path scales a seven-day window,
//! runs a recurrent model and inverse-scales its temperature output.

mod features;
pub(crate) mod forest;
mod inference;
#[cfg(test)]
pub(crate) mod onnx_fixtures;
mod output;
mod point;
pub(crate) mod recurrent;
mod sequence;

pub use features::FeatureExtractor;
pub use forest::{EstimatorArtifact, ForestArtifact, ForestModel, TreeArtifact};
pub use inference::{OnnxPointModel, OnnxSequenceModel};
pub use output::{round_to, OutputConfig, OutputFormatter, OUTPUT_DECIMALS};
pub use point::PointPredictor;
pub use recurrent::{RecurrentArtifact, RecurrentModel};
pub use sequence::SequencePredictor;

use crate::error::Result;
use crate::schema::{FEATURE_COUNT, WINDOW_LEN};

/// Scaled window as fed to a sequence model, oldest day first
pub type ScaledWindow = [[f32; FEATURE_COUNT]; WINDOW_LEN];

/// Multi-output regressor consuming one unscaled observation
pub trait PointModel: Send + Sync {
    /// Predict `[temperatura, lluvia]` from features in schema order
    fn predict(&self, features: &[f32; FEATURE_COUNT]) -> Result<[f64; 2]>;

    /// Model family name for logs
    fn family(&self) -> &'static str;
}

/// Recurrent model consuming a scaled window
pub trait SequenceModel: Send + Sync {
    /// Predict the scaled temperature of the day after the window
    fn predict(&self, window: &ScaledWindow) -> Result<f64>;

    /// Model family name for logs
    fn family(&self) -> &'static str;
}
