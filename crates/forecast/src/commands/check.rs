//! `forecast check`: validate a deployment without serving a request

use crate::config::ForecastConfig;
use anyhow::Result;
use forecast_lib::schema::SCHEMA_VERSION;
use forecast_lib::{ArtifactInfo, PointPredictor, SequencePredictor, StructuredLogger};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CheckReport {
    schema_version: &'static str,
    artifacts: Vec<ArtifactInfo>,
}

pub fn run(config: &ForecastConfig) -> Result<()> {
    let logger = StructuredLogger::new("check");
    let report = collect(config).map_err(|err| {
        logger.log_failure(&err);
        err
    })?;

    for artifact in &report.artifacts {
        logger.log_artifact_loaded(artifact);
    }
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn collect(config: &ForecastConfig) -> forecast_lib::Result<CheckReport> {
    let point = PointPredictor::load(&config.point_model_path)?;
    let sequence = SequencePredictor::load(&config.sequence_model_path, &config.scaler_path)?;

    Ok(CheckReport {
        schema_version: SCHEMA_VERSION,
        artifacts: vec![
            ArtifactInfo::describe("point_model", &config.point_model_path, point.family())?,
            ArtifactInfo::describe(
                "sequence_model",
                &config.sequence_model_path,
                sequence.family(),
            )?,
            ArtifactInfo::describe("scaler", &config.scaler_path, "min-max")?,
        ],
    })
}
