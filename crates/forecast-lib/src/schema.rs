//! Feature schema shared by every artifact and every inference path
//!
//! The column order below is the order the models were trained on. It is
//! defined once here; the observation parser, the scaler and both model
//! loaders read it from this module instead of repeating field lists.

use crate::error::{ForecastError, Result};
use std::fmt;

/// Bumped whenever the column list or its order changes
pub const SCHEMA_VERSION: &str = "1";

/// Number of features per observation
pub const FEATURE_COUNT: usize = 6;

/// Number of consecutive daily observations in a sequence window
pub const WINDOW_LEN: usize = 7;

/// One meteorological feature, in training column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Temperatura,
    Humedad,
    Presion,
    Viento,
    Lluvia,
    Nubes,
}

/// Training column order
pub const FEATURE_ORDER: [Feature; FEATURE_COUNT] = [
    Feature::Temperatura,
    Feature::Humedad,
    Feature::Presion,
    Feature::Viento,
    Feature::Lluvia,
    Feature::Nubes,
];

/// Output order of the point model: `[temperatura, lluvia]`
pub const POINT_TARGETS: [Feature; 2] = [Feature::Temperatura, Feature::Lluvia];

/// Scaled column emitted by the sequence model
pub const SEQUENCE_TARGET: Feature = Feature::Temperatura;

impl Feature {
    /// Wire name used in input JSON and artifact metadata
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Temperatura => "temperatura",
            Feature::Humedad => "humedad",
            Feature::Presion => "presion",
            Feature::Viento => "viento",
            Feature::Lluvia => "lluvia",
            Feature::Nubes => "nubes",
        }
    }

    /// Column position in `FEATURE_ORDER`
    pub const fn index(self) -> usize {
        match self {
            Feature::Temperatura => 0,
            Feature::Humedad => 1,
            Feature::Presion => 2,
            Feature::Viento => 3,
            Feature::Lluvia => 4,
            Feature::Nubes => 5,
        }
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        FEATURE_ORDER.iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that an artifact's declared columns match `FEATURE_ORDER` exactly
pub fn check_feature_names<S: AsRef<str>>(names: &[S]) -> Result<()> {
    check_columns(&FEATURE_ORDER, names)
}

/// Check that an artifact's declared targets match the given order exactly
pub fn check_columns<S: AsRef<str>>(expected: &[Feature], names: &[S]) -> Result<()> {
    let matches = names.len() == expected.len()
        && expected
            .iter()
            .zip(names)
            .all(|(f, n)| f.name() == n.as_ref());
    if matches {
        return Ok(());
    }
    let expected: Vec<&str> = expected.iter().map(|f| f.name()).collect();
    Err(ForecastError::SchemaMismatch {
        expected: join_names(&expected),
        actual: join_names(names),
    })
}
