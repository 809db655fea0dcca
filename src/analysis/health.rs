//! Overall health percentage from anomaly score and trends

use crate::types::Trend;

const SCORE_PENALTY: f64 = 15.0;
const RISING_TREND_PENALTY: f64 = 10.0;

/// `clamp(round(100 − 15·score − 10·[vibration rising] − 10·[temperature rising]), 0, 100)`
pub fn overall_health(anomaly_score: f64, vibration: Trend, temperature: Trend) -> u8 {
    let score = if anomaly_score.is_finite() { anomaly_score } else { 0.0 };
    let mut health = 100.0 - SCORE_PENALTY * score;
    if vibration.is_increasing() {
        health -= RISING_TREND_PENALTY;
    }
    if temperature.is_increasing() {
        health -= RISING_TREND_PENALTY;
    }
    health.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_machine_is_100() {
        assert_eq!(overall_health(0.0, Trend::Stable, Trend::Decreasing), 100);
    }

    #[test]
    fn penalties_add_up() {
        // 100 - 15 - 10 - 10
        assert_eq!(overall_health(1.0, Trend::Increasing, Trend::Increasing), 65);
        // 100 - 25 rounds to 75
        assert_eq!(overall_health(5.0 / 3.0, Trend::Stable, Trend::Stable), 75);
    }

    #[test]
    fn clamped_to_zero() {
        assert_eq!(overall_health(50.0, Trend::Increasing, Trend::Increasing), 0);
    }
}
