//! Config Validation Tests
//!
//! Typo detection, value validation and plausibility warnings for
//! plantwatch.toml, exercised independently from the rest of the engine.

use plantwatch::config::validation::{
    known_config_keys, suggest_correction, validate_plausibility, validate_unknown_keys,
};
use plantwatch::config::{ConfigError, PlantWatchConfig};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_detection_key_warns_with_suggestion() {
    let toml_str = r#"
[detection]
vibration_wieght = 0.6
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("vibration_wieght"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("detection.vibration_weight"),
        "Should suggest the correct spelling"
    );
}

#[test]
fn typo_in_site_section_warns() {
    let toml_str = r#"
[site]
naem = "Plant-3"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("site.name"));
}

#[test]
fn full_valid_config_produces_zero_warnings() {
    let toml_str = r#"
[site]
name = "Plant-3 Line A"

[sensor]
accel_scale_lsb_per_g = 8192.0
gyro_scale_lsb_per_dps = 65.5
gravity_g = 1.0

[window]
size = 250
ema_alpha = 0.3

[thresholds]
vibration_critical_multiplier = 1.5
environmental_critical_multiplier = 1.25

[detection]
min_history = 12
history_limit = 120
vibration_weight = 0.5
temperature_weight = 0.3
rotation_weight = 0.2
score_divisor = 3.0
warning_score = 1.5
critical_score = 2.5
recommendation_z = 2.0
historical_anomaly_z = 1.5

[trend]
window = 25
band_percent = 4.0

[monitor]
threshold_interval_secs = 15
analysis_interval_secs = 60
alert_dedup_secs = 600
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(
        warnings.is_empty(),
        "Valid config should produce 0 warnings, got: {:?}",
        warnings.iter().map(|w| &w.field).collect::<Vec<_>>()
    );

    let config = PlantWatchConfig::from_toml_str(toml_str).expect("config should parse");
    assert_eq!(config.window.size, 250);
    assert_eq!(config.trend.window, 25);
    assert_eq!(config.monitor.alert_dedup_secs, 600);
}

#[test]
fn multiple_typos_all_warned() {
    let toml_str = r#"
[window]
sise = 100

[monitor]
alert_dedupe_secs = 60
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 2, "Expected 2 warnings for 2 typos");
}

#[test]
fn empty_toml_produces_zero_warnings_and_defaults() {
    assert!(validate_unknown_keys("").is_empty());
    let config = PlantWatchConfig::from_toml_str("").expect("empty config is valid");
    assert_eq!(config, PlantWatchConfig::default());
}

#[test]
fn known_keys_set_is_complete() {
    let toml_str = PlantWatchConfig::default()
        .to_toml()
        .expect("Default config should serialize");
    let warnings = validate_unknown_keys(&toml_str);
    assert!(
        warnings.is_empty(),
        "Default config serialization should produce 0 unknown-key warnings, got: {:?}",
        warnings.iter().map(|w| &w.field).collect::<Vec<_>>()
    );
}

#[test]
fn suggest_correction_returns_none_for_garbage() {
    let known = known_config_keys();
    assert!(suggest_correction("zzz_completely_invalid_xyz_12345", &known).is_none());
}

// ============================================================================
// Value Validation
// ============================================================================

fn validation_errors(config: &PlantWatchConfig) -> Vec<String> {
    match config.validate() {
        Err(ConfigError::Validation(errors)) => errors,
        Err(other) => panic!("unexpected error: {other}"),
        Ok(()) => Vec::new(),
    }
}

#[test]
fn default_config_is_valid() {
    assert!(PlantWatchConfig::default().validate().is_ok());
}

#[test]
fn critical_score_must_exceed_warning() {
    let mut config = PlantWatchConfig::default();
    config.detection.critical_score = 1.0;
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("critical_score")));
}

#[test]
fn ema_alpha_out_of_range_is_error() {
    for alpha in [0.0, -0.1, 1.5, f64::NAN] {
        let mut config = PlantWatchConfig::default();
        config.window.ema_alpha = alpha;
        let errors = validation_errors(&config);
        assert!(
            errors.iter().any(|e| e.contains("ema_alpha")),
            "alpha {alpha} should be rejected"
        );
    }
}

#[test]
fn multiplier_below_one_is_error() {
    let mut config = PlantWatchConfig::default();
    config.thresholds.vibration_critical_multiplier = 0.9;
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("vibration_critical_multiplier")));
}

#[test]
fn all_zero_weights_is_error() {
    let mut config = PlantWatchConfig::default();
    config.detection.vibration_weight = 0.0;
    config.detection.temperature_weight = 0.0;
    config.detection.rotation_weight = 0.0;
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("weights")));
}

#[test]
fn history_limit_below_min_history_is_error() {
    let mut config = PlantWatchConfig::default();
    config.detection.history_limit = 5;
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("history_limit")));
}

#[test]
fn zero_interval_is_error() {
    let mut config = PlantWatchConfig::default();
    config.monitor.threshold_interval_secs = 0;
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("threshold_interval_secs")));
}

#[test]
fn invalid_toml_value_is_rejected_at_parse() {
    let toml_str = r#"
[window]
ema_alpha = 2.0
"#;
    let err = PlantWatchConfig::from_toml_str(toml_str).unwrap_err();
    assert!(err.to_string().contains("ema_alpha"));
}

// ============================================================================
// Plausibility Warnings
// ============================================================================

#[test]
fn short_history_limit_warns_about_trends() {
    let mut config = PlantWatchConfig::default();
    config.detection.history_limit = 30;
    let warnings = validate_plausibility(&config);
    assert!(warnings.iter().any(|w| w.field == "detection.history_limit"));
}

#[test]
fn analysis_faster_than_threshold_checks_warns() {
    let mut config = PlantWatchConfig::default();
    config.monitor.analysis_interval_secs = 10;
    let warnings = validate_plausibility(&config);
    assert!(warnings.iter().any(|w| w.field == "monitor.analysis_interval_secs"));
}

// ============================================================================
// File Round Trip
// ============================================================================

#[test]
fn save_and_load_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plantwatch.toml");

    let mut config = PlantWatchConfig::default();
    config.site.name = "Plant-9".to_string();
    config.trend.band_percent = 7.5;
    config.save_to_file(&path).expect("save");

    let loaded = PlantWatchConfig::load_from_file(&path).expect("load");
    assert_eq!(loaded, config);
}

#[test]
fn missing_file_is_io_error() {
    let err = PlantWatchConfig::load_from_file(std::path::Path::new("/nonexistent/plantwatch.toml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}
