//! Feature extraction for ML inference
//!
//! Projects observations onto the fixed-order numeric arrays the models
//! were trained on. The point model takes raw values; the sequence model
//! takes min-max scaled values stacked day by day.

use super::ScaledWindow;
use crate::models::{Observation, Window};
use crate::scaler::MinMaxScaler;
use crate::schema::{FEATURE_COUNT, WINDOW_LEN};

/// Extracts model input arrays from observations
pub struct FeatureExtractor<'a> {
    scaler: Option<&'a MinMaxScaler>,
}

impl<'a> FeatureExtractor<'a> {
    /// Raw values, as the point model expects
    pub fn unscaled() -> Self {
        Self { scaler: None }
    }

    /// Values passed through the training-time scaler
    pub fn scaled(scaler: &'a MinMaxScaler) -> Self {
        Self {
            scaler: Some(scaler),
        }
    }

    pub fn extract(&self, observation: &Observation) -> [f32; FEATURE_COUNT] {
        let values = match self.scaler {
            Some(scaler) => scaler.transform(observation.values()),
            None => *observation.values(),
        };
        values.map(|v| v as f32)
    }

    /// Stack every day of the window in chronological order
    pub fn extract_window(&self, window: &Window) -> ScaledWindow {
        let mut out = [[0.0; FEATURE_COUNT]; WINDOW_LEN];
        for (row, day) in out.iter_mut().zip(window.days()) {
            *row = self.extract(day);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler() -> MinMaxScaler {
        MinMaxScaler::new(
            [0.0, 0.0, 950.0, 0.0, 0.0, 0.0],
            [40.0, 100.0, 1050.0, 100.0, 50.0, 100.0],
        )
        .unwrap()
    }

    fn window() -> Window {
        let days: Vec<Observation> = (0..WINDOW_LEN)
            .map(|i| Observation::new([10.0 + i as f64 * 4.0, 50.0, 1000.0, 20.0, 5.0, 40.0]))
            .collect();
        Window::try_from(days).unwrap()
    }

    #[test]
    fn test_unscaled_keeps_raw_values() {
        let obs = Observation::new([22.0, 60.0, 1012.0, 10.0, 0.0, 20.0]);
        let features = FeatureExtractor::unscaled().extract(&obs);
        assert_eq!(features, [22.0, 60.0, 1012.0, 10.0, 0.0, 20.0]);
    }

    #[test]
    fn test_scaled_values_in_unit_range() {
        let scaler = scaler();
        let rows = FeatureExtractor::scaled(&scaler).extract_window(&window());
        for row in rows {
            assert!(row.iter().all(|v| (0.0..=1.0).contains(v)), "{:?}", row);
        }
    }

    #[test]
    fn test_window_rows_follow_days() {
        let scaler = scaler();
        let rows = FeatureExtractor::scaled(&scaler).extract_window(&window());
        assert!((rows[0][0] - 0.25).abs() < 1e-6);
        assert!((rows[6][0] - 0.85).abs() < 1e-6);
        for pair in rows.windows(2) {
            assert!(pair[0][0] < pair[1][0]);
        }
    }
}
