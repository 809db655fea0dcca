//! Threshold Evaluator - configured machine limits vs the current reading
//!
//! A metric is a warning when its value is strictly above the limit and
//! critical when strictly above `limit × multiplier`. Vibration escalates at
//! ×1.5, the environmental metrics at ×1.2. Limits of zero or below are
//! "not configured" and skipped.

use crate::config::{defaults, ThresholdConfig};
use crate::types::{MachineThresholds, MetricKind, SensorReading, ThresholdViolation, ViolationSeverity};

/// Vibration above this share of its limit adds [`VIBRATION_RISK`]
const VIBRATION_RISK_RATIO: f64 = 0.8;
const VIBRATION_RISK: u8 = 30;
const PRESSURE_RISK_RATIO: f64 = 0.9;
const PRESSURE_RISK: u8 = 40;
const TEMPERATURE_RISK_RATIO: f64 = 0.85;
const TEMPERATURE_RISK: u8 = 30;

/// Reading values in the units the limits are configured in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatedValues {
    /// m/s²
    pub vibration: f64,
    /// °C
    pub temperature: f64,
    /// PSI
    pub pressure: f64,
    /// %
    pub humidity: f64,
}

impl EvaluatedValues {
    pub fn from_reading(reading: &SensorReading) -> Self {
        Self {
            vibration: reading.vibration_rms * defaults::STANDARD_GRAVITY_MS2,
            temperature: reading.temperature,
            pressure: reading.pressure * defaults::PSI_PER_BAR,
            humidity: reading.humidity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdEvaluator {
    vibration_critical_multiplier: f64,
    environmental_critical_multiplier: f64,
}

impl Default for ThresholdEvaluator {
    fn default() -> Self {
        Self::new(
            defaults::VIBRATION_CRITICAL_MULTIPLIER,
            defaults::ENVIRONMENTAL_CRITICAL_MULTIPLIER,
        )
    }
}

impl ThresholdEvaluator {
    pub fn new(vibration_critical_multiplier: f64, environmental_critical_multiplier: f64) -> Self {
        Self {
            vibration_critical_multiplier,
            environmental_critical_multiplier,
        }
    }

    pub fn from_config(config: &ThresholdConfig) -> Self {
        Self::new(
            config.vibration_critical_multiplier,
            config.environmental_critical_multiplier,
        )
    }

    pub fn critical_multiplier(&self, metric: MetricKind) -> f64 {
        match metric {
            MetricKind::Vibration => self.vibration_critical_multiplier,
            MetricKind::Temperature | MetricKind::Pressure | MetricKind::Humidity => {
                self.environmental_critical_multiplier
            }
        }
    }

    /// Violations of `reading` against `thresholds`, in the order vibration,
    /// temperature, pressure, humidity.
    pub fn evaluate(
        &self,
        reading: &SensorReading,
        thresholds: &MachineThresholds,
    ) -> Vec<ThresholdViolation> {
        let values = EvaluatedValues::from_reading(reading);
        [
            (MetricKind::Vibration, values.vibration, thresholds.max_acceleration),
            (MetricKind::Temperature, values.temperature, thresholds.max_temperature),
            (MetricKind::Pressure, values.pressure, thresholds.max_pressure_psi),
            (MetricKind::Humidity, values.humidity, thresholds.max_humidity),
        ]
        .into_iter()
        .filter_map(|(metric, value, limit)| self.check(metric, value, limit))
        .collect()
    }

    fn check(&self, metric: MetricKind, value: f64, limit: f64) -> Option<ThresholdViolation> {
        if !limit.is_finite() || limit <= 0.0 || !value.is_finite() {
            return None;
        }
        let severity = if value > limit * self.critical_multiplier(metric) {
            ViolationSeverity::Critical
        } else if value > limit {
            ViolationSeverity::Warning
        } else {
            return None;
        };
        Some(ThresholdViolation {
            metric,
            value,
            threshold: limit,
            severity,
        })
    }
}

/// Early-warning risk (0-100) from how close a reading is to its limits.
pub fn risk_score(reading: &SensorReading, thresholds: &MachineThresholds) -> u8 {
    let values = EvaluatedValues::from_reading(reading);
    let near = |value: f64, limit: f64, ratio: f64| limit > 0.0 && value > limit * ratio;

    let mut risk: u8 = 0;
    if near(values.vibration, thresholds.max_acceleration, VIBRATION_RISK_RATIO) {
        risk += VIBRATION_RISK;
    }
    if near(values.pressure, thresholds.max_pressure_psi, PRESSURE_RISK_RATIO) {
        risk += PRESSURE_RISK;
    }
    if near(values.temperature, thresholds.max_temperature, TEMPERATURE_RISK_RATIO) {
        risk += TEMPERATURE_RISK;
    }
    risk.min(100)
}
