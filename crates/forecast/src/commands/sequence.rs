//! `forecast sequence`: seven daily observations in, next-day temperature out

use super::{read_stdin, run_logged};
use crate::config::ForecastConfig;
use forecast_lib::{ArtifactInfo, SequencePredictor, StructuredLogger};
use std::time::Instant;

pub fn run(config: &ForecastConfig) -> anyhow::Result<()> {
    let logger = StructuredLogger::new("sequence");

    run_logged(&logger, || {
        let predictor =
            SequencePredictor::load(&config.sequence_model_path, &config.scaler_path)?;
        logger.log_artifact_loaded(&ArtifactInfo::describe(
            "scaler",
            &config.scaler_path,
            "min-max",
        )?);
        logger.log_artifact_loaded(&ArtifactInfo::describe(
            "sequence_model",
            &config.sequence_model_path,
            predictor.family(),
        )?);

        let input = read_stdin()?;
        let start = Instant::now();
        let result = predictor.predict_json(&input)?;
        logger.log_prediction(&result, predictor.family(), start.elapsed());
        Ok(result)
    })
}
