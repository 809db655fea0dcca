//! Signal helpers over reading histories

use crate::types::SensorReading;

/// Indices of local vibration maxima above `threshold`.
///
/// A reading is a peak when its vibration RMS is strictly greater than both
/// neighbours and than `threshold`. The first and last readings have only one
/// neighbour and are never reported.
pub fn detect_peaks(readings: &[SensorReading], threshold: f64) -> Vec<usize> {
    readings
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| {
            let (prev, current, next) = (w[0].vibration_rms, w[1].vibration_rms, w[2].vibration_rms);
            (current > prev && current > next && current > threshold).then_some(i + 1)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<SensorReading> {
        values
            .iter()
            .map(|&v| SensorReading {
                vibration_rms: v,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn finds_local_maxima_above_threshold() {
        let readings = series(&[0.1, 0.5, 0.2, 0.3, 0.25, 0.9, 0.1]);
        assert_eq!(detect_peaks(&readings, 0.28), vec![1, 3, 5]);
        assert_eq!(detect_peaks(&readings, 0.4), vec![1, 5]);
    }

    #[test]
    fn plateaus_and_edges_are_not_peaks() {
        let readings = series(&[0.9, 0.5, 0.5, 0.1]);
        assert!(detect_peaks(&readings, 0.0).is_empty());
        assert!(detect_peaks(&series(&[1.0, 2.0]), 0.0).is_empty());
    }
}
