//! Statistical Anomaly Detector - z-scores of the newest reading against
//! the machine's own history
//!
//! The history is newest first. Index 0 is the reading under test; the rest
//! form the baseline. Three metrics are scored (vibration RMS, temperature,
//! rotation magnitude) and combined into one weighted score:
//!
//! ```text
//! score = (w_v·z_v + w_t·z_t + w_r·z_r) / divisor
//! ```
//!
//! with weights 0.5 / 0.3 / 0.2 and divisor 3 by default. Score > 2.5 is
//! CRITICAL, > 1.5 WARNING.

use tracing::debug;

use crate::config::{defaults, DetectionConfig};
use crate::types::{AnomalyResult, MetricZScores, SensorReading, Severity, Trend};

use super::statistics::Baseline;

/// Score at which confidence saturates at 1
const CONFIDENCE_FULL_SCALE: f64 = 3.0;

/// Health above which a normal machine earns the "excellent condition" note
const EXCELLENT_HEALTH: u8 = 90;

/// Baseline statistics and scores of one detection run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineEvaluation {
    pub latest: SensorReading,
    pub vibration: Baseline,
    pub temperature: Baseline,
    pub rotation: Baseline,
    pub z_scores: MetricZScores,
    pub anomaly_score: f64,
    pub severity: Severity,
    pub confidence: f64,
    /// Readings considered, newest included
    pub total_readings: usize,
}

/// Trend context used to extend the plain recommendations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendContext {
    pub vibration: Trend,
    pub temperature: Trend,
    pub overall_health: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyDetector {
    config: DetectionConfig,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl AnomalyDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Minimum history length for a baseline
    pub fn min_history(&self) -> usize {
        self.config.min_history.max(2)
    }

    /// Score `history` (newest first) and build the recommendation list.
    pub fn detect(&self, history: &[SensorReading]) -> AnomalyResult {
        match self.evaluate(history) {
            Some(evaluation) => self.to_result(&evaluation, None),
            None => self.insufficient_data(history.len()),
        }
    }

    /// Baseline statistics and scores, `None` when the history is too short.
    pub fn evaluate(&self, history: &[SensorReading]) -> Option<BaselineEvaluation> {
        let history = &history[..history.len().min(self.config.history_limit.max(1))];
        if history.len() < self.min_history() {
            return None;
        }

        let latest = history[0];
        let baseline = &history[1..];

        let vibration = Baseline::from_values(&collect(baseline, |r| r.vibration_rms));
        let temperature = Baseline::from_values(&collect(baseline, |r| r.temperature));
        let rotation = Baseline::from_values(&collect(baseline, SensorReading::rotation_magnitude));

        let z_scores = MetricZScores {
            vibration: vibration.z_score(latest.vibration_rms),
            temperature: temperature.z_score(latest.temperature),
            rotation: rotation.z_score(latest.rotation_magnitude()),
        };

        let anomaly_score = self.combined_score(&z_scores);
        let severity = self.classify(anomaly_score);
        let confidence = (anomaly_score / CONFIDENCE_FULL_SCALE).clamp(0.0, 1.0);

        debug!(
            z_vibration = z_scores.vibration,
            z_temperature = z_scores.temperature,
            z_rotation = z_scores.rotation,
            score = anomaly_score,
            severity = %severity,
            "Baseline evaluation"
        );

        Some(BaselineEvaluation {
            latest,
            vibration,
            temperature,
            rotation,
            z_scores,
            anomaly_score,
            severity,
            confidence,
            total_readings: history.len(),
        })
    }

    /// Weighted combination of the per-metric z-scores.
    pub fn combined_score(&self, z: &MetricZScores) -> f64 {
        let divisor = if self.config.score_divisor > 0.0 {
            self.config.score_divisor
        } else {
            defaults::SCORE_DIVISOR
        };
        let weighted = self.config.vibration_weight * z.vibration
            + self.config.temperature_weight * z.temperature
            + self.config.rotation_weight * z.rotation;
        let score = weighted / divisor;
        if score.is_finite() {
            score.max(0.0)
        } else {
            0.0
        }
    }

    pub fn classify(&self, score: f64) -> Severity {
        if score > self.config.critical_score {
            Severity::Critical
        } else if score > self.config.warning_score {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }

    /// Full result from an evaluation, with trend-aware notes when `context`
    /// is supplied.
    pub fn to_result(
        &self,
        evaluation: &BaselineEvaluation,
        context: Option<&TrendContext>,
    ) -> AnomalyResult {
        AnomalyResult {
            is_anomaly: evaluation.severity.is_anomalous(),
            severity: evaluation.severity,
            confidence: evaluation.confidence,
            anomaly_score: evaluation.anomaly_score,
            z_scores: evaluation.z_scores,
            recommendations: self.recommendations(evaluation, context),
            insufficient_data: false,
        }
    }

    pub fn recommendations(
        &self,
        evaluation: &BaselineEvaluation,
        context: Option<&TrendContext>,
    ) -> Vec<String> {
        let limit = self.config.recommendation_z;
        let latest = &evaluation.latest;
        let z = &evaluation.z_scores;
        let mut recs = Vec::new();

        if z.vibration > limit {
            recs.push(format!(
                "Abnormal vibration: {:.3} g (baseline mean {:.3} g)",
                latest.vibration_rms, evaluation.vibration.mean
            ));
            recs.push("Inspect bearings and check balance of rotating components".to_string());
            if context.is_some_and(|c| c.vibration.is_increasing()) {
                recs.push("Vibration is trending upward - schedule an urgent inspection".to_string());
            }
        }

        if z.temperature > limit {
            recs.push(format!(
                "Temperature out of range: {:.1}°C (baseline mean {:.1}°C)",
                latest.temperature, evaluation.temperature.mean
            ));
            recs.push("Check the cooling system and lubrication".to_string());
            if context.is_some_and(|c| c.temperature.is_increasing()) {
                recs.push("Overheating trend - immediate attention required".to_string());
            }
        }

        if z.rotation > limit {
            recs.push(format!(
                "Irregular rotation: {:.2}°/s (baseline mean {:.2}°/s)",
                latest.rotation_magnitude(),
                evaluation.rotation.mean
            ));
            recs.push("Inspect bearings and shaft alignment".to_string());
        }

        if recs.is_empty() {
            recs.push("Operation within normal parameters".to_string());
            recs.push("Continue regular monitoring".to_string());
            if context.is_some_and(|c| c.overall_health > EXCELLENT_HEALTH) {
                recs.push("Machine is in excellent condition".to_string());
            }
        }

        recs
    }

    /// Baseline readings whose mean vibration/temperature z-score exceeds
    /// the historical anomaly threshold.
    pub fn historical_anomaly_count(&self, evaluation: &BaselineEvaluation, baseline: &[SensorReading]) -> usize {
        baseline
            .iter()
            .filter(|r| {
                let zv = evaluation.vibration.z_score(r.vibration_rms);
                let zt = evaluation.temperature.z_score(r.temperature);
                (zv + zt) / 2.0 > self.config.historical_anomaly_z
            })
            .count()
    }

    pub fn insufficient_data(&self, available: usize) -> AnomalyResult {
        AnomalyResult {
            is_anomaly: false,
            severity: Severity::Normal,
            confidence: 0.0,
            anomaly_score: 0.0,
            z_scores: MetricZScores::default(),
            recommendations: vec![format!(
                "Insufficient history for analysis ({available} of {} readings)",
                self.min_history()
            )],
            insufficient_data: true,
        }
    }
}

fn collect(readings: &[SensorReading], metric: impl Fn(&SensorReading) -> f64) -> Vec<f64> {
    readings.iter().map(metric).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Baseline alternating `center ± spread` gives mean `center` and
    /// population σ `spread` when the count is even.
    fn history_with(
        latest: SensorReading,
        baseline_len: usize,
        vib: (f64, f64),
        temp: (f64, f64),
    ) -> Vec<SensorReading> {
        let mut history = vec![latest];
        for i in 0..baseline_len {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            history.push(SensorReading {
                timestamp: 1_000 - i as i64,
                vibration_rms: vib.0 + sign * vib.1,
                temperature: temp.0 + sign * temp.1,
                ..SensorReading::default()
            });
        }
        history
    }

    fn reading(vibration_rms: f64, temperature: f64) -> SensorReading {
        SensorReading {
            timestamp: 2_000,
            vibration_rms,
            temperature,
            ..SensorReading::default()
        }
    }

    #[test]
    fn short_history_is_insufficient() {
        let detector = AnomalyDetector::default();
        let history = history_with(reading(0.5, 40.0), 8, (0.5, 0.05), (40.0, 1.0));
        assert_eq!(history.len(), 9);

        let result = detector.detect(&history);
        assert!(result.insufficient_data);
        assert!(!result.is_anomaly);
        assert_eq!(result.severity, Severity::Normal);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.z_scores, MetricZScores::default());
        assert_eq!(result.recommendations.len(), 1);
        assert!(result.recommendations[0].contains("9 of 10"));
    }

    #[test]
    fn ten_readings_are_enough() {
        let detector = AnomalyDetector::default();
        let history = history_with(reading(0.5, 40.0), 9, (0.5, 0.05), (40.0, 1.0));
        assert!(!detector.detect(&history).insufficient_data);
    }

    #[test]
    fn constant_history_scores_zero() {
        let detector = AnomalyDetector::default();
        let history = history_with(reading(0.5, 40.0), 20, (0.5, 0.0), (40.0, 0.0));
        let result = detector.detect(&history);
        assert_eq!(result.anomaly_score, 0.0);
        assert_eq!(result.severity, Severity::Normal);
        assert_eq!(
            result.recommendations,
            vec!["Operation within normal parameters", "Continue regular monitoring"]
        );
    }

    #[test]
    fn ten_sigma_vibration_alone_is_warning() {
        let detector = AnomalyDetector::default();
        // σ 0.05 → 0.5 + 10σ = 1.0
        let history = history_with(reading(1.0, 40.0), 20, (0.5, 0.05), (40.0, 1.0));
        let result = detector.detect(&history);

        assert!((result.z_scores.vibration - 10.0).abs() < 1e-9);
        assert!(result.z_scores.temperature.abs() < 1e-9);
        assert!((result.anomaly_score - 5.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.severity, Severity::Warning);
        assert!(result.is_anomaly);
        assert!(result.recommendations[0].starts_with("Abnormal vibration"));
        assert!(result.recommendations[1].contains("bearings"));
    }

    #[test]
    fn five_sigma_temperature_alone_is_normal_with_recommendation() {
        let detector = AnomalyDetector::default();
        let history = history_with(reading(0.5, 45.0), 20, (0.5, 0.05), (40.0, 1.0));
        let result = detector.detect(&history);

        assert!((result.z_scores.temperature - 5.0).abs() < 1e-9);
        assert!((result.anomaly_score - 0.5).abs() < 1e-9);
        assert_eq!(result.severity, Severity::Normal);
        assert!(!result.is_anomaly);
        assert!(result.recommendations[0].starts_with("Temperature out of range"));
        assert!(result.recommendations[1].contains("cooling"));
    }

    #[test]
    fn large_vibration_deviation_is_critical() {
        let detector = AnomalyDetector::default();
        // 16σ → score 8/3 > 2.5
        let history = history_with(reading(1.3, 40.0), 20, (0.5, 0.05), (40.0, 1.0));
        let result = detector.detect(&history);
        assert_eq!(result.severity, Severity::Critical);
        assert!((result.confidence - (8.0 / 3.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn confidence_saturates_at_one() {
        let detector = AnomalyDetector::default();
        let history = history_with(reading(5.0, 90.0), 20, (0.5, 0.05), (40.0, 1.0));
        let result = detector.detect(&history);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn rotation_contributes_to_score() {
        let detector = AnomalyDetector::default();
        let mut history = history_with(reading(0.5, 40.0), 20, (0.5, 0.0), (40.0, 0.0));
        for (i, r) in history.iter_mut().enumerate().skip(1) {
            r.gyroscope_z = if i % 2 == 0 { 11.0 } else { 9.0 };
        }
        history[0].gyroscope_z = 20.0;

        let result = detector.detect(&history);
        assert!((result.z_scores.rotation - 10.0).abs() < 1e-9);
        assert!((result.anomaly_score - 2.0 / 3.0).abs() < 1e-9);
        assert!(result.recommendations[0].starts_with("Irregular rotation"));
    }

    #[test]
    fn history_is_truncated_to_limit() {
        let config = DetectionConfig {
            history_limit: 10,
            ..DetectionConfig::default()
        };
        let detector = AnomalyDetector::new(config);
        let mut history = history_with(reading(0.5, 40.0), 9, (0.5, 0.0), (40.0, 0.0));
        // Older outliers past the limit never enter the baseline
        history.extend(std::iter::repeat(reading(9.0, 90.0)).take(30));

        let evaluation = detector.evaluate(&history);
        assert_eq!(evaluation.map(|e| e.total_readings), Some(10));
        assert_eq!(evaluation.map(|e| e.anomaly_score), Some(0.0));
    }

    #[test]
    fn trend_context_adds_notes() {
        let detector = AnomalyDetector::default();
        let history = history_with(reading(1.0, 45.0), 20, (0.5, 0.05), (40.0, 1.0));
        let evaluation = detector.evaluate(&history).unwrap();
        let context = TrendContext {
            vibration: Trend::Increasing,
            temperature: Trend::Increasing,
            overall_health: 50,
        };
        let recs = detector.recommendations(&evaluation, Some(&context));
        assert_eq!(recs.len(), 6);
        assert!(recs[2].contains("urgent inspection"));
        assert!(recs[5].contains("Overheating"));
    }

    #[test]
    fn healthy_machine_gets_excellent_note() {
        let detector = AnomalyDetector::default();
        let history = history_with(reading(0.5, 40.0), 20, (0.5, 0.05), (40.0, 1.0));
        let evaluation = detector.evaluate(&history).unwrap();
        let context = TrendContext {
            vibration: Trend::Stable,
            temperature: Trend::Stable,
            overall_health: 100,
        };
        let recs = detector.recommendations(&evaluation, Some(&context));
        assert_eq!(recs.last().map(String::as_str), Some("Machine is in excellent condition"));
    }

    #[test]
    fn historical_anomalies_are_counted() {
        let detector = AnomalyDetector::default();
        let mut history = history_with(reading(0.5, 40.0), 20, (0.5, 0.05), (40.0, 1.0));
        history[5].vibration_rms = 2.0;
        history[5].temperature = 60.0;
        let evaluation = detector.evaluate(&history).unwrap();
        assert_eq!(detector.historical_anomaly_count(&evaluation, &history[1..]), 1);
    }
}
