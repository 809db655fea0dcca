//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " — did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for PlantWatchConfig.
///
/// Maintained by hand to match the struct hierarchy in monitor_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [site]
        "site",
        "site.name",
        // [sensor]
        "sensor",
        "sensor.accel_scale_lsb_per_g",
        "sensor.gyro_scale_lsb_per_dps",
        "sensor.gravity_g",
        "sensor.gyro_bias_dps",
        // [window]
        "window",
        "window.size",
        "window.ema_alpha",
        // [thresholds]
        "thresholds",
        "thresholds.vibration_critical_multiplier",
        "thresholds.environmental_critical_multiplier",
        // [detection]
        "detection",
        "detection.min_history",
        "detection.history_limit",
        "detection.vibration_weight",
        "detection.temperature_weight",
        "detection.rotation_weight",
        "detection.score_divisor",
        "detection.warning_score",
        "detection.critical_score",
        "detection.recommendation_z",
        "detection.historical_anomaly_z",
        // [trend]
        "trend",
        "trend.window",
        "trend.band_percent",
        // [monitor]
        "monitor",
        "monitor.threshold_interval_secs",
        "monitor.analysis_interval_secs",
        "monitor.alert_dedup_secs",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys — it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| {
            let suggestion = suggest_correction(&key, &known);
            ValidationWarning {
                message: format!("Unknown config key '{key}'"),
                field: key,
                suggestion,
            }
        })
        .collect()
}

// ============================================================================
// Plausibility Checks
// ============================================================================

/// Accelerometer sensitivities of the standard ±2/4/8/16 g ranges (LSB/g)
const STANDARD_ACCEL_SCALES: [f64; 4] = [16_384.0, 8_192.0, 4_096.0, 2_048.0];

/// Gyroscope sensitivities of the standard ±250/500/1000/2000 °/s ranges
const STANDARD_GYRO_SCALES: [f64; 4] = [131.0, 65.5, 32.8, 16.4];

/// Zero-rate offsets beyond this usually mean the machine was running
/// during calibration
const MAX_PLAUSIBLE_GYRO_BIAS_DPS: f64 = 10.0;

/// Flag values that are legal but unusual for an IMU-based deployment.
pub fn validate_plausibility(config: &super::PlantWatchConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let accel = config.sensor.accel_scale_lsb_per_g;
    if !STANDARD_ACCEL_SCALES.iter().any(|s| (s - accel).abs() < 1e-6) {
        warnings.push(ValidationWarning {
            field: "sensor.accel_scale_lsb_per_g".to_string(),
            message: format!(
                "sensor.accel_scale_lsb_per_g = {accel} does not match a standard accelerometer range"
            ),
            suggestion: None,
        });
    }

    let gyro = config.sensor.gyro_scale_lsb_per_dps;
    if !STANDARD_GYRO_SCALES.iter().any(|s| (s - gyro).abs() < 1e-6) {
        warnings.push(ValidationWarning {
            field: "sensor.gyro_scale_lsb_per_dps".to_string(),
            message: format!(
                "sensor.gyro_scale_lsb_per_dps = {gyro} does not match a standard gyroscope range"
            ),
            suggestion: None,
        });
    }

    let bias = config.sensor.gyro_bias_dps;
    if bias.iter().any(|b| b.abs() > MAX_PLAUSIBLE_GYRO_BIAS_DPS) {
        warnings.push(ValidationWarning {
            field: "sensor.gyro_bias_dps".to_string(),
            message: format!(
                "sensor.gyro_bias_dps = {bias:?} exceeds {MAX_PLAUSIBLE_GYRO_BIAS_DPS} °/s on at least one axis; recalibrate at rest"
            ),
            suggestion: None,
        });
    }

    if config.detection.history_limit < 2 * config.trend.window + 1 {
        warnings.push(ValidationWarning {
            field: "detection.history_limit".to_string(),
            message: format!(
                "detection.history_limit = {} leaves fewer than two trend windows of {} — trends will always read stable",
                config.detection.history_limit, config.trend.window
            ),
            suggestion: None,
        });
    }

    if config.monitor.analysis_interval_secs < config.monitor.threshold_interval_secs {
        warnings.push(ValidationWarning {
            field: "monitor.analysis_interval_secs".to_string(),
            message: format!(
                "monitor.analysis_interval_secs = {} is shorter than threshold_interval_secs = {}",
                config.monitor.analysis_interval_secs, config.monitor.threshold_interval_secs
            ),
            suggestion: None,
        });
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("hello", "hello"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("ema_alpah", "ema_alpha"), 2);
        assert_eq!(levenshtein("windw", "window"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [detection]
            min_history = 12
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"detection".to_string()));
        assert!(keys.contains(&"detection.min_history".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[detection]
critcal_score = 2.5
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("critcal_score"));
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("detection.critical_score")
        );
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[site]
name = "Line-2"

[window]
size = 250
ema_alpha = 0.3

[monitor]
alert_dedup_secs = 600
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {:?}", warnings);
    }

    #[test]
    fn test_unknown_section_without_close_match() {
        let toml_str = r#"
[dashboard]
theme = "dark"
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.field.starts_with("dashboard")));
    }

    #[test]
    fn test_large_gyro_bias_is_implausible() {
        let mut config = crate::config::PlantWatchConfig::default();
        config.sensor.gyro_bias_dps = [0.4, -25.0, 0.1];
        let warnings = validate_plausibility(&config);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "sensor.gyro_bias_dps");
    }

    #[test]
    fn test_default_config_is_plausible() {
        let warnings = validate_plausibility(&crate::config::PlantWatchConfig::default());
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn test_nonstandard_scale_warns() {
        let mut config = crate::config::PlantWatchConfig::default();
        config.sensor.accel_scale_lsb_per_g = 1000.0;
        let warnings = validate_plausibility(&config);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "sensor.accel_scale_lsb_per_g");
    }
}
