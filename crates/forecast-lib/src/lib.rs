//! Weather forecast inference library
//!
//! This crate provides the core functionality for:
//! - The shared feature schema (column names and training order)
//! - Observation and window parsing from JSON
//! - Min-max scaling with per-column inverse
//! - Point (tree ensemble) and sequence (recurrent) inference
//! - Artifact loading and structured logging

pub mod artifacts;
pub mod error;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod scaler;
pub mod schema;

pub use artifacts::ArtifactInfo;
pub use error::{ForecastError, Result};
pub use models::*;
pub use observability::StructuredLogger;
pub use predictor::{PointPredictor, SequencePredictor};
pub use scaler::MinMaxScaler;
