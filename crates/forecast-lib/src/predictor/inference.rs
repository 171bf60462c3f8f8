//! ONNX inference using tract
//!
//! Both predictors accept ONNX exports of their models. The plan is
//! parsed, pinned to the single-request input shape, optimized once at
//! process start and run exactly once.

use super::{PointModel, ScaledWindow, SequenceModel};
use crate::error::{ForecastError, Result};
use crate::schema::{FEATURE_COUNT, WINDOW_LEN};
use anyhow::Context;
use std::path::Path;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::debug;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Parse and optimize an ONNX model with a fixed input fact
fn load_plan(path: &Path, input: InferenceFact) -> Result<TractModel> {
    let plan = tract_onnx::onnx()
        .model_for_path(path)
        .context("Failed to parse ONNX model")
        .and_then(|model| {
            model
                .with_input_fact(0, input)
                .context("Failed to set input shape")
        })
        .and_then(|model| model.into_optimized().context("Failed to optimize model"))
        .and_then(|model| {
            model
                .into_runnable()
                .context("Failed to create runnable model")
        })
        .map_err(|e| ForecastError::invalid_artifact(path, format!("{:#}", e)))?;
    Ok(plan)
}

/// Run the plan on one tensor and flatten its first output
fn run_plan(plan: &TractModel, input: Tensor) -> anyhow::Result<Vec<f32>> {
    let start = Instant::now();
    let result = plan.run(tvec!(input.into()))?;
    let output = result.first().context("No output from model")?;
    let values: Vec<f32> = output.to_array_view::<f32>()?.iter().copied().collect();
    debug!(elapsed_us = start.elapsed().as_micros() as u64, "Inference completed");
    Ok(values)
}

/// Multi-output regressor exported to ONNX, input `f32 [1, 6]`
pub struct OnnxPointModel {
    plan: TractModel,
}

impl OnnxPointModel {
    pub fn load(path: &Path) -> Result<Self> {
        let plan = load_plan(path, f32::fact([1, FEATURE_COUNT]).into())?;
        Ok(Self { plan })
    }
}

impl PointModel for OnnxPointModel {
    fn predict(&self, features: &[f32; FEATURE_COUNT]) -> Result<[f64; 2]> {
        let values = Tensor::from_shape(&[1, FEATURE_COUNT], &features[..])
            .and_then(|input| run_plan(&self.plan, input))
            .map_err(ForecastError::Inference)?;

        // One value per target, nothing more
        let &[temperatura, lluvia] = values.as_slice() else {
            return Err(ForecastError::ShapeMismatch {
                what: "point model output",
                expected: 2,
                actual: values.len(),
            });
        };
        Ok([f64::from(temperatura), f64::from(lluvia)])
    }

    fn family(&self) -> &'static str {
        "onnx"
    }
}

/// Recurrent network exported to ONNX, input `f32 [1, 7, 6]`
pub struct OnnxSequenceModel {
    plan: TractModel,
}

impl OnnxSequenceModel {
    pub fn load(path: &Path) -> Result<Self> {
        let plan = load_plan(path, f32::fact([1, WINDOW_LEN, FEATURE_COUNT]).into())?;
        Ok(Self { plan })
    }
}

impl SequenceModel for OnnxSequenceModel {
    fn predict(&self, window: &ScaledWindow) -> Result<f64> {
        let flat: Vec<f32> = window.iter().flatten().copied().collect();
        let values = Tensor::from_shape(&[1, WINDOW_LEN, FEATURE_COUNT], &flat[..])
            .and_then(|input| run_plan(&self.plan, input))
            .map_err(ForecastError::Inference)?;

        // A per-timestep export yields seven values; only the final forecast is valid
        let &[temperature] = values.as_slice() else {
            return Err(ForecastError::ShapeMismatch {
                what: "sequence model output",
                expected: 1,
                actual: values.len(),
            });
        };
        Ok(f64::from(temperature))
    }

    fn family(&self) -> &'static str {
        "onnx"
    }
}
