//! Core data models for weather forecasting

use crate::error::{ForecastError, Result};
use crate::schema::{Feature, FEATURE_COUNT, FEATURE_ORDER, WINDOW_LEN};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// One day's weather reading, values held in schema column order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    values: [f64; FEATURE_COUNT],
}

impl Observation {
    /// Build from values already in `FEATURE_ORDER`
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Parse a flat JSON object keyed by feature name.
    ///
    /// Keys may appear in any order and unknown keys are ignored. Every
    /// schema feature must be present and be a JSON number; nothing is
    /// imputed.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in FEATURE_ORDER {
            let value = map.get(feature.name()).ok_or_else(|| {
                ForecastError::InputMalformed(format!("missing field `{}`", feature))
            })?;
            values[feature.index()] = value.as_f64().ok_or_else(|| {
                ForecastError::InputMalformed(format!(
                    "field `{}` must be a number, got {}",
                    feature, value
                ))
            })?;
        }
        Ok(Self { values })
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(ForecastError::InputMalformed(format!(
                "expected an observation object, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }
}

impl<'de> Deserialize<'de> for Observation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Observation::from_map(&map).map_err(D::Error::custom)
    }
}

impl Serialize for Observation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for feature in FEATURE_ORDER {
            map.serialize_entry(feature.name(), &self.get(feature))?;
        }
        map.end()
    }
}

/// Seven consecutive daily observations, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    days: [Observation; WINDOW_LEN],
}

impl Window {
    /// Parse a JSON array of observation objects
    pub fn from_value(value: &Value) -> Result<Self> {
        let items = value.as_array().ok_or_else(|| {
            ForecastError::InputMalformed(format!(
                "expected an array of {} observations, got {}",
                WINDOW_LEN,
                json_kind(value)
            ))
        })?;
        let days = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Observation::from_value(item).map_err(|e| match e {
                    ForecastError::InputMalformed(msg) => {
                        ForecastError::InputMalformed(format!("day {}: {}", i, msg))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::try_from(days)
    }

    pub fn days(&self) -> &[Observation; WINDOW_LEN] {
        &self.days
    }
}

impl TryFrom<Vec<Observation>> for Window {
    type Error = ForecastError;

    fn try_from(days: Vec<Observation>) -> Result<Self> {
        let actual = days.len();
        let days: [Observation; WINDOW_LEN] =
            days.try_into().map_err(|_| ForecastError::ShapeMismatch {
                what: "window length",
                expected: WINDOW_LEN,
                actual,
            })?;
        Ok(Self { days })
    }
}

/// Forecast emitted on stdout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub temperatura_predicha: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lluvia_predicha: Option<f64>,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
