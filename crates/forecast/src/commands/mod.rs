//! Subcommand implementations

pub mod check;
pub mod point;
pub mod sequence;

use forecast_lib::{ForecastError, PredictionResult, Result, StructuredLogger};
use std::io::{Read, Write};

/// Read the whole request before any processing starts
pub fn read_stdin() -> Result<String> {
    let mut input = Vec::new();
    std::io::stdin().read_to_end(&mut input)?;
    String::from_utf8(input).map_err(|e| {
        ForecastError::InputMalformed(format!("input is not valid UTF-8: {}", e.utf8_error()))
    })
}

/// Write the single JSON result line to stdout
pub fn emit(result: &PredictionResult) -> Result<()> {
    let line = serde_json::to_string(result).map_err(|e| ForecastError::Io(e.into()))?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line)?;
    stdout.flush()?;
    Ok(())
}

/// Run one prediction, logging any failure before it propagates
pub fn run_logged<F>(logger: &StructuredLogger, predict: F) -> anyhow::Result<()>
where
    F: FnOnce() -> Result<PredictionResult>,
{
    match predict().and_then(|result| emit(&result)) {
        Ok(()) => Ok(()),
        Err(err) => {
            logger.log_failure(&err);
            Err(err.into())
        }
    }
}
