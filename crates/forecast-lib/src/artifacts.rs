//! Artifact loading
//!
//! Model and scaler files are produced by the offline training jobs and
//! only ever read here. The model family is picked from the file
//! extension: `.onnx` goes through tract, `.json` holds a native forest or
//! recurrent network.

use crate::error::{ForecastError, Result};
use crate::predictor::{
    ForestArtifact, ForestModel, OnnxPointModel, OnnxSequenceModel, PointModel,
    RecurrentArtifact, RecurrentModel, SequenceModel,
};
use crate::scaler::MinMaxScaler;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Serialization format of a model artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Onnx,
    Json,
}

impl ModelFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("onnx") => Ok(Self::Onnx),
            Some("json") => Ok(Self::Json),
            other => Err(ForecastError::invalid_artifact(
                path,
                format!(
                    "unsupported model extension {:?}, expected .onnx or .json",
                    other.unwrap_or("")
                ),
            )),
        }
    }
}

/// What was loaded, for logs and the `check` report
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub kind: &'static str,
    pub path: PathBuf,
    pub family: &'static str,
    pub sha256: String,
}

impl ArtifactInfo {
    /// Fingerprint a loaded artifact
    pub fn describe(kind: &'static str, path: &Path, family: &'static str) -> Result<Self> {
        Ok(Self {
            kind,
            path: path.to_path_buf(),
            family,
            sha256: sha256_file(path)?,
        })
    }
}

/// Fail with `ArtifactMissing` unless `path` is an existing file
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ForecastError::ArtifactMissing {
            path: path.to_path_buf(),
        })
    }
}

/// Hex-encoded SHA-256 of a file's contents
pub fn sha256_file(path: &Path) -> Result<String> {
    ensure_exists(path)?;
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| ForecastError::invalid_artifact(path, e))
}

/// Attach the real path to validation errors raised before it was known
fn with_path(path: &Path, err: ForecastError) -> ForecastError {
    match err {
        ForecastError::ArtifactInvalid { reason, .. } => {
            ForecastError::invalid_artifact(path, reason)
        }
        other => other,
    }
}

pub fn load_point_model(path: &Path) -> Result<Box<dyn PointModel>> {
    ensure_exists(path)?;
    let model: Box<dyn PointModel> = match ModelFormat::from_path(path)? {
        ModelFormat::Onnx => {
            warn!(
                path = %path.display(),
                "ONNX point model cannot declare its target order; assuming [temperatura, lluvia]"
            );
            Box::new(OnnxPointModel::load(path)?)
        }
        ModelFormat::Json => {
            let artifact: ForestArtifact = read_json(path)?;
            let forest = ForestModel::from_artifact(&artifact).map_err(|e| with_path(path, e))?;
            debug!(trees = forest.tree_count(), "Forest parsed");
            Box::new(forest)
        }
    };
    Ok(model)
}

pub fn load_sequence_model(path: &Path) -> Result<Box<dyn SequenceModel>> {
    ensure_exists(path)?;
    let model: Box<dyn SequenceModel> = match ModelFormat::from_path(path)? {
        ModelFormat::Onnx => Box::new(OnnxSequenceModel::load(path)?),
        ModelFormat::Json => {
            let artifact: RecurrentArtifact = read_json(path)?;
            let lstm = RecurrentModel::from_artifact(&artifact).map_err(|e| with_path(path, e))?;
            debug!(units = lstm.units(), "Recurrent network parsed");
            Box::new(lstm)
        }
    };
    Ok(model)
}

pub fn load_scaler(path: &Path) -> Result<MinMaxScaler> {
    MinMaxScaler::load(path)
}

/// Check that the sequence model is the one the scaler was fitted with.
///
/// Only possible when the training side recorded the model digest in the
/// scaler artifact; without it the pairing is trusted.
pub fn verify_pairing(scaler: &MinMaxScaler, model_path: &Path) -> Result<()> {
    let Some(expected) = scaler.model_sha256() else {
        debug!("Scaler carries no model digest, pairing unchecked");
        return Ok(());
    };
    let actual = sha256_file(model_path)?;
    if actual != expected {
        return Err(ForecastError::ArtifactMismatch {
            model: model_path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
