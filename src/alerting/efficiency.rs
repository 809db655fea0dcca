//! Efficiency Scorer - threshold violations to a 0-100 efficiency figure

use crate::types::{MachineThresholds, SensorReading, ThresholdViolation, ViolationSeverity};

use super::evaluator::ThresholdEvaluator;

pub const FULL_EFFICIENCY: u8 = 100;
pub const WARNING_EFFICIENCY: u8 = 70;
pub const CRITICAL_EFFICIENCY: u8 = 30;

/// 100 with no violations, 30 if any is critical, 70 otherwise.
pub fn reading_score(violations: &[ThresholdViolation]) -> u8 {
    if violations.is_empty() {
        FULL_EFFICIENCY
    } else if violations
        .iter()
        .any(|v| v.severity == ViolationSeverity::Critical)
    {
        CRITICAL_EFFICIENCY
    } else {
        WARNING_EFFICIENCY
    }
}

/// Rounded mean reading score, `None` when there is nothing to score
/// (no thresholds configured or no readings).
pub fn try_machine_efficiency(
    evaluator: &ThresholdEvaluator,
    readings: &[SensorReading],
    thresholds: Option<&MachineThresholds>,
) -> Option<u8> {
    let thresholds = thresholds?;
    if readings.is_empty() {
        return None;
    }
    let scores: Vec<u8> = readings
        .iter()
        .map(|r| reading_score(&evaluator.evaluate(r, thresholds)))
        .collect();
    Some(rounded_mean(&scores))
}

/// Like [`try_machine_efficiency`], but reports an unknown machine as 100.
pub fn machine_efficiency(
    evaluator: &ThresholdEvaluator,
    readings: &[SensorReading],
    thresholds: Option<&MachineThresholds>,
) -> u8 {
    try_machine_efficiency(evaluator, readings, thresholds).unwrap_or(FULL_EFFICIENCY)
}

/// Rounded mean of machine efficiencies; 0 for an empty fleet.
pub fn fleet_efficiency(machine_efficiencies: &[u8]) -> u8 {
    if machine_efficiencies.is_empty() {
        return 0;
    }
    rounded_mean(machine_efficiencies)
}

fn rounded_mean(scores: &[u8]) -> u8 {
    let sum: u64 = scores.iter().map(|&s| u64::from(s)).sum();
    (sum as f64 / scores.len() as f64).round().clamp(0.0, 100.0) as u8
}
