//! `forecast point`: one observation object in, temperature and rainfall out

use super::{read_stdin, run_logged};
use crate::config::ForecastConfig;
use forecast_lib::{ArtifactInfo, PointPredictor, StructuredLogger};
use std::time::Instant;

pub fn run(config: &ForecastConfig) -> anyhow::Result<()> {
    let logger = StructuredLogger::new("point");

    run_logged(&logger, || {
        // Artifacts load before stdin is touched
        let path = &config.point_model_path;
        let predictor = PointPredictor::load(path)?;
        logger.log_artifact_loaded(&ArtifactInfo::describe(
            "point_model",
            path,
            predictor.family(),
        )?);

        let input = read_stdin()?;
        let start = Instant::now();
        let result = predictor.predict_json(&input)?;
        logger.log_prediction(&result, predictor.family(), start.elapsed());
        Ok(result)
    })
}
