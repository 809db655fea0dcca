//! Per-machine consolidation: anomaly detection, trends, health and the
//! maintenance schedule in one [`MachineAnalysis`]

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::alerting::risk_score;
use crate::config::PlantWatchConfig;
use crate::processing::detect_peaks;
use crate::types::{
    AnalysisOutcome, HealthStatus, HistoricalSummary, Machine, MachineAnalysis, SensorReading,
    TrendAnalysis,
};

use super::anomaly::{AnomalyDetector, TrendContext};
use super::health::overall_health;
use super::maintenance::MaintenanceScheduler;
use super::trend::TrendAnalyzer;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineAnalyzer {
    detector: AnomalyDetector,
    trend: TrendAnalyzer,
    scheduler: MaintenanceScheduler,
}

impl MachineAnalyzer {
    pub fn new(detector: AnomalyDetector, trend: TrendAnalyzer) -> Self {
        Self {
            detector,
            trend,
            scheduler: MaintenanceScheduler::new(),
        }
    }

    pub fn from_config(config: &PlantWatchConfig) -> Self {
        Self::new(
            AnomalyDetector::new(config.detection.clone()),
            TrendAnalyzer::from_config(&config.trend),
        )
    }

    pub fn detector(&self) -> &AnomalyDetector {
        &self.detector
    }

    /// Analyse `history` (newest first), scheduling relative to UTC today.
    pub fn analyze(&self, machine: &Machine, history: &[SensorReading]) -> AnalysisOutcome {
        self.analyze_on(machine, history, Utc::now().date_naive())
    }

    pub fn analyze_on(
        &self,
        machine: &Machine,
        history: &[SensorReading],
        today: NaiveDate,
    ) -> AnalysisOutcome {
        let Some(evaluation) = self.detector.evaluate(history) else {
            debug!(
                machine = %machine.id,
                available = history.len(),
                required = self.detector.min_history(),
                "Not enough history for analysis"
            );
            return AnalysisOutcome::InsufficientData {
                machine_id: machine.id.clone(),
                available: history.len(),
                required: self.detector.min_history(),
            };
        };

        let baseline = &history[1..evaluation.total_readings];
        let vibration_trend = self.trend.classify(&chronological(baseline, |r| r.vibration_rms));
        let temperature_trend = self.trend.classify(&chronological(baseline, |r| r.temperature));
        let health = overall_health(evaluation.anomaly_score, vibration_trend, temperature_trend);

        let context = TrendContext {
            vibration: vibration_trend,
            temperature: temperature_trend,
            overall_health: health,
        };
        let anomaly = self.detector.to_result(&evaluation, Some(&context));

        let mut maintenance = self.scheduler.schedule_on(
            evaluation.severity,
            evaluation.anomaly_score,
            vibration_trend,
            temperature_trend,
            today,
        );
        maintenance.machine_id.clone_from(&machine.id);
        maintenance.machine_name.clone_from(&machine.name);

        let historical = HistoricalSummary {
            avg_vibration: evaluation.vibration.mean,
            avg_temperature: evaluation.temperature.mean,
            total_readings: evaluation.total_readings,
            anomaly_count: self.detector.historical_anomaly_count(&evaluation, baseline),
            vibration_peaks: detect_peaks(
                baseline,
                evaluation.vibration.mean
                    + self.detector.config().recommendation_z * evaluation.vibration.std_dev,
            )
            .len(),
        };
        let risk = machine
            .thresholds
            .as_ref()
            .map_or(0, |limits| risk_score(&evaluation.latest, limits));

        info!(
            machine = %machine.id,
            severity = %evaluation.severity,
            score = evaluation.anomaly_score,
            health,
            risk,
            priority = %maintenance.priority,
            "Machine analysed"
        );

        AnalysisOutcome::Complete(Box::new(MachineAnalysis {
            machine_id: machine.id.clone(),
            machine_name: machine.name.clone(),
            status: HealthStatus::from(evaluation.severity),
            anomaly,
            trend: TrendAnalysis {
                vibration_trend,
                temperature_trend,
                overall_health: health,
            },
            maintenance,
            historical,
            risk_score: risk,
        }))
    }
}

/// Metric values of a newest-first slice, oldest first.
fn chronological(readings: &[SensorReading], metric: impl Fn(&SensorReading) -> f64) -> Vec<f64> {
    readings.iter().rev().map(metric).collect()
}
