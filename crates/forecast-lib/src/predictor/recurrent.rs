//! Single-layer LSTM with a dense head, evaluated natively
//!
//! Weight layout follows the common Keras export: `kernel` is
//! `[features][4 * units]`, `recurrent_kernel` is `[units][4 * units]`,
//! `bias` is `[4 * units]`, gates packed as input, forget, cell, output.
//! Gates use the logistic sigmoid, cell and hidden state use tanh.

use super::{ScaledWindow, SequenceModel};
use crate::error::{ForecastError, Result};
use crate::schema::{check_feature_names, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrentArtifact {
    /// Input columns, must equal the feature schema
    pub features: Vec<String>,
    pub units: usize,
    pub kernel: Vec<Vec<f32>>,
    pub recurrent_kernel: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    pub dense_kernel: Vec<f32>,
    pub dense_bias: f32,
}

#[derive(Debug, Clone)]
pub struct RecurrentModel {
    units: usize,
    /// Row-major `[FEATURE_COUNT][4 * units]`
    kernel: Vec<f32>,
    /// Row-major `[units][4 * units]`
    recurrent_kernel: Vec<f32>,
    bias: Vec<f32>,
    dense_kernel: Vec<f32>,
    dense_bias: f32,
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn flatten(
    what: &'static str,
    rows: &[Vec<f32>],
    expected_rows: usize,
    width: usize,
) -> Result<Vec<f32>> {
    if rows.len() != expected_rows {
        return Err(ForecastError::ShapeMismatch {
            what,
            expected: expected_rows,
            actual: rows.len(),
        });
    }
    let mut flat = Vec::with_capacity(expected_rows * width);
    for row in rows {
        if row.len() != width {
            return Err(ForecastError::ShapeMismatch {
                what,
                expected: width,
                actual: row.len(),
            });
        }
        flat.extend_from_slice(row);
    }
    Ok(flat)
}

impl RecurrentModel {
    pub fn from_artifact(artifact: &RecurrentArtifact) -> Result<Self> {
        check_feature_names(&artifact.features)?;
        let units = artifact.units;
        if units == 0 {
            return Err(ForecastError::invalid_artifact(
                "<recurrent>",
                "units must be positive",
            ));
        }
        let gates = 4 * units;

        let kernel = flatten("lstm kernel", &artifact.kernel, FEATURE_COUNT, gates)?;
        let recurrent_kernel =
            flatten("lstm recurrent kernel", &artifact.recurrent_kernel, units, gates)?;
        if artifact.bias.len() != gates {
            return Err(ForecastError::ShapeMismatch {
                what: "lstm bias",
                expected: gates,
                actual: artifact.bias.len(),
            });
        }
        if artifact.dense_kernel.len() != units {
            return Err(ForecastError::ShapeMismatch {
                what: "dense kernel",
                expected: units,
                actual: artifact.dense_kernel.len(),
            });
        }

        let all_finite = kernel
            .iter()
            .chain(&recurrent_kernel)
            .chain(&artifact.bias)
            .chain(&artifact.dense_kernel)
            .chain(std::iter::once(&artifact.dense_bias))
            .all(|w| w.is_finite());
        if !all_finite {
            return Err(ForecastError::invalid_artifact(
                "<recurrent>",
                "weights contain NaN or infinity",
            ));
        }

        Ok(Self {
            units,
            kernel,
            recurrent_kernel,
            bias: artifact.bias.clone(),
            dense_kernel: artifact.dense_kernel.clone(),
            dense_bias: artifact.dense_bias,
        })
    }

    pub fn units(&self) -> usize {
        self.units
    }

    /// Advance one timestep, updating hidden and cell state in place
    fn step(&self, x: &[f32; FEATURE_COUNT], h: &mut [f32], c: &mut [f32]) {
        let u = self.units;
        let gates = 4 * u;
        let mut z = self.bias.clone();

        for (j, &xj) in x.iter().enumerate() {
            let row = &self.kernel[j * gates..(j + 1) * gates];
            for (zk, w) in z.iter_mut().zip(row) {
                *zk += xj * w;
            }
        }
        for (j, &hj) in h.iter().enumerate() {
            let row = &self.recurrent_kernel[j * gates..(j + 1) * gates];
            for (zk, w) in z.iter_mut().zip(row) {
                *zk += hj * w;
            }
        }

        for n in 0..u {
            let input = sigmoid(z[n]);
            let forget = sigmoid(z[u + n]);
            let candidate = z[2 * u + n].tanh();
            let output = sigmoid(z[3 * u + n]);
            c[n] = forget * c[n] + input * candidate;
            h[n] = output * c[n].tanh();
        }
    }
}

impl SequenceModel for RecurrentModel {
    fn predict(&self, window: &ScaledWindow) -> Result<f64> {
        let mut h = vec![0.0f32; self.units];
        let mut c = vec![0.0f32; self.units];
        for day in window {
            self.step(day, &mut h, &mut c);
        }
        let out: f32 = self.dense_bias
            + h.iter()
                .zip(&self.dense_kernel)
                .map(|(hn, w)| hn * w)
                .sum::<f32>();
        Ok(f64::from(out))
    }

    fn family(&self) -> &'static str {
        "recurrent"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::{FEATURE_ORDER, WINDOW_LEN};

    /// One-unit LSTM whose output tracks a decayed sum of scaled temperature.
    ///
    /// Input and output gates are saturated open, the forget gate sits at
    /// 0.5 and the candidate is `tanh(0.1 * t)`, so for a constant window
    /// the dense head returns roughly the scaled temperature itself.
    pub(crate) fn tracking_lstm() -> RecurrentArtifact {
        let mut kernel = vec![vec![0.0; 4]; FEATURE_COUNT];
        kernel[0][2] = 0.1;
        RecurrentArtifact {
            features: FEATURE_ORDER.iter().map(|f| f.name().to_string()).collect(),
            units: 1,
            kernel,
            recurrent_kernel: vec![vec![0.0; 4]],
            bias: vec![10.0, 0.0, 0.0, 10.0],
            dense_kernel: vec![5.0],
            dense_bias: 0.0,
        }
    }

    fn constant_window(t: f32) -> ScaledWindow {
        [[t, 0.5, 0.5, 0.5, 0.5, 0.5]; WINDOW_LEN]
    }

    #[test]
    fn test_constant_window_tracks_input() {
        let model = RecurrentModel::from_artifact(&tracking_lstm()).unwrap();
        for t in [0.1f32, 0.55, 0.9] {
            let out = model.predict(&constant_window(t)).unwrap();
            assert!((out - f64::from(t)).abs() < 0.03, "t={} out={}", t, out);
        }
    }

    #[test]
    fn test_order_changes_output() {
        let model = RecurrentModel::from_artifact(&tracking_lstm()).unwrap();
        let mut rising = constant_window(0.0);
        for (i, day) in rising.iter_mut().enumerate() {
            day[0] = i as f32 / 6.0;
        }
        let mut falling = rising;
        falling.reverse();

        let a = model.predict(&rising).unwrap();
        let b = model.predict(&falling).unwrap();
        assert!((a - b).abs() > 0.1, "rising={} falling={}", a, b);
        assert!(a > b, "recent days should weigh more");
    }

    #[test]
    fn test_zero_state_zero_input() {
        let mut artifact = tracking_lstm();
        artifact.dense_bias = 0.25;
        let model = RecurrentModel::from_artifact(&artifact).unwrap();
        let out = model.predict(&[[0.0; FEATURE_COUNT]; WINDOW_LEN]).unwrap();
        assert!((out - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_wrong_kernel_width() {
        let mut artifact = tracking_lstm();
        artifact.kernel[3].push(0.0);
        assert!(matches!(
            RecurrentModel::from_artifact(&artifact),
            Err(ForecastError::ShapeMismatch { what: "lstm kernel", .. })
        ));
    }

    #[test]
    fn test_wrong_feature_count() {
        let mut artifact = tracking_lstm();
        artifact.kernel.pop();
        assert!(matches!(
            RecurrentModel::from_artifact(&artifact),
            Err(ForecastError::ShapeMismatch { expected: 6, actual: 5, .. })
        ));
    }

    #[test]
    fn test_wrong_dense_width() {
        let mut artifact = tracking_lstm();
        artifact.dense_kernel.push(1.0);
        assert!(RecurrentModel::from_artifact(&artifact).is_err());
    }

    #[test]
    fn test_zero_units_rejected() {
        let mut artifact = tracking_lstm();
        artifact.units = 0;
        assert!(RecurrentModel::from_artifact(&artifact).is_err());
    }

    #[test]
    fn test_non_finite_weights_rejected() {
        let mut artifact = tracking_lstm();
        artifact.bias[1] = f32::NAN;
        assert!(RecurrentModel::from_artifact(&artifact).is_err());
    }
}
