//! Monitor Configuration - sensor scales, detection tuning and polling cadence
//! as operator-tunable TOML values
//!
//! Each struct implements `Default` with values matching [`super::defaults`],
//! so a missing file or a missing key never changes behaviour.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PLANTWATCH_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "plantwatch.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a PlantWatch deployment.
///
/// Load with `PlantWatchConfig::load()` which searches:
/// 1. `$PLANTWATCH_CONFIG` env var
/// 2. `./plantwatch.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantWatchConfig {
    /// Site identification
    #[serde(default)]
    pub site: SiteInfo,

    /// IMU scale factors
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Rolling window and smoothing
    #[serde(default)]
    pub window: WindowConfig,

    /// Threshold escalation multipliers
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Statistical anomaly detection
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Trend classification
    #[serde(default)]
    pub trend: TrendConfig,

    /// Fleet polling cadence
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl PlantWatchConfig {
    /// Load configuration using the standard search order:
    /// 1. `$PLANTWATCH_CONFIG` environment variable
    /// 2. `./plantwatch.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), site = %config.site.name, "Loaded config from PLANTWATCH_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from PLANTWATCH_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "PLANTWATCH_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./plantwatch.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(site = %config.site.name, "Loaded config from ./plantwatch.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./plantwatch.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No plantwatch.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are reported as warnings only.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Scale factors, multipliers and divisors must be positive
    /// - Critical score must exceed the warning score
    /// - Detection weights must be non-negative and not all zero
    /// - EMA alpha must lie in (0, 1]
    /// - Window sizes, history sizes and intervals must be > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let s = &self.sensor;
        Self::check_positive(s.accel_scale_lsb_per_g, "sensor.accel_scale_lsb_per_g", &mut errors);
        Self::check_positive(s.gyro_scale_lsb_per_dps, "sensor.gyro_scale_lsb_per_dps", &mut errors);
        if !s.gravity_g.is_finite() || s.gravity_g < 0.0 {
            errors.push(format!("sensor.gravity_g must be a finite value >= 0 (got {})", s.gravity_g));
        }
        if s.gyro_bias_dps.iter().any(|b| !b.is_finite()) {
            errors.push(format!("sensor.gyro_bias_dps must be finite (got {:?})", s.gyro_bias_dps));
        }

        let w = &self.window;
        if w.size == 0 {
            errors.push("window.size must be > 0".to_string());
        }
        if !(w.ema_alpha > 0.0 && w.ema_alpha <= 1.0) {
            errors.push(format!("window.ema_alpha must be in (0, 1], got {}", w.ema_alpha));
        }

        let t = &self.thresholds;
        Self::check_multiplier(t.vibration_critical_multiplier, "thresholds.vibration_critical_multiplier", &mut errors);
        Self::check_multiplier(
            t.environmental_critical_multiplier,
            "thresholds.environmental_critical_multiplier",
            &mut errors,
        );

        let d = &self.detection;
        if d.min_history < 2 {
            errors.push(format!(
                "detection.min_history must be >= 2 (one reading plus a baseline), got {}",
                d.min_history
            ));
        }
        if d.history_limit < d.min_history {
            errors.push(format!(
                "detection.history_limit ({}) must be >= min_history ({})",
                d.history_limit, d.min_history
            ));
        }
        let weights = [d.vibration_weight, d.temperature_weight, d.rotation_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            errors.push("detection weights must be finite and >= 0".to_string());
        } else if weights.iter().sum::<f64>() <= 0.0 {
            errors.push("detection weights must not all be zero".to_string());
        }
        Self::check_positive(d.score_divisor, "detection.score_divisor", &mut errors);
        Self::check_positive(d.warning_score, "detection.warning_score", &mut errors);
        if d.critical_score <= d.warning_score {
            errors.push(format!(
                "detection.critical_score ({:.2}) must be > warning_score ({:.2})",
                d.critical_score, d.warning_score
            ));
        }
        Self::check_positive(d.recommendation_z, "detection.recommendation_z", &mut errors);
        Self::check_positive(d.historical_anomaly_z, "detection.historical_anomaly_z", &mut errors);

        if self.trend.window == 0 {
            errors.push("trend.window must be > 0".to_string());
        }
        if !self.trend.band_percent.is_finite() || self.trend.band_percent < 0.0 {
            errors.push(format!("trend.band_percent must be >= 0, got {}", self.trend.band_percent));
        }

        let m = &self.monitor;
        if m.threshold_interval_secs == 0 {
            errors.push("monitor.threshold_interval_secs must be > 0".to_string());
        }
        if m.analysis_interval_secs == 0 {
            errors.push("monitor.analysis_interval_secs must be > 0".to_string());
        }

        for w in super::validation::validate_plausibility(self) {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass — catch them explicitly
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} must be a finite value > 0 (got {value})"));
        }
    }

    fn check_multiplier(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() || value < 1.0 {
            errors.push(format!("{name} must be >= 1.0 (got {value})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Sections
// ============================================================================

/// Site / deployment identification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    /// Plant or line name used in logs
    #[serde(default = "default_site_name")]
    pub name: String,
}

fn default_site_name() -> String {
    "unnamed-site".to_string()
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self { name: default_site_name() }
    }
}

/// IMU scale factors. Defaults match an MPU-6050 at ±2 g / ±250 °/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    #[serde(default = "default_accel_scale")]
    pub accel_scale_lsb_per_g: f64,

    #[serde(default = "default_gyro_scale")]
    pub gyro_scale_lsb_per_dps: f64,

    /// Static gravity reference subtracted from the magnitude (g)
    #[serde(default = "default_gravity")]
    pub gravity_g: f64,

    /// Gyroscope offset per axis at rest (°/s), subtracted from every
    /// rotation reading. Measure it with `plantwatch calibrate`.
    #[serde(default)]
    pub gyro_bias_dps: [f64; 3],
}

fn default_accel_scale() -> f64 { defaults::ACCEL_SCALE_LSB_PER_G }
fn default_gyro_scale() -> f64 { defaults::GYRO_SCALE_LSB_PER_DPS }
fn default_gravity() -> f64 { defaults::GRAVITY_G }

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            accel_scale_lsb_per_g: default_accel_scale(),
            gyro_scale_lsb_per_dps: default_gyro_scale(),
            gravity_g: default_gravity(),
            gyro_bias_dps: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Vibration samples retained per stream
    #[serde(default = "default_window_size")]
    pub size: usize,

    /// EMA smoothing factor
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f64,
}

fn default_window_size() -> usize { defaults::WINDOW_SIZE }
fn default_ema_alpha() -> f64 { defaults::EMA_ALPHA }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: default_window_size(),
            ema_alpha: default_ema_alpha(),
        }
    }
}

/// Critical escalation multipliers, one per metric family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_vibration_multiplier")]
    pub vibration_critical_multiplier: f64,

    /// Applied to temperature, pressure and humidity
    #[serde(default = "default_environmental_multiplier")]
    pub environmental_critical_multiplier: f64,
}

fn default_vibration_multiplier() -> f64 { defaults::VIBRATION_CRITICAL_MULTIPLIER }
fn default_environmental_multiplier() -> f64 { defaults::ENVIRONMENTAL_CRITICAL_MULTIPLIER }

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            vibration_critical_multiplier: default_vibration_multiplier(),
            environmental_critical_multiplier: default_environmental_multiplier(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum history entries (newest included)
    #[serde(default = "default_min_history")]
    pub min_history: usize,

    /// Readings fetched per machine for analysis
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_vibration_weight")]
    pub vibration_weight: f64,

    #[serde(default = "default_temperature_weight")]
    pub temperature_weight: f64,

    #[serde(default = "default_rotation_weight")]
    pub rotation_weight: f64,

    #[serde(default = "default_score_divisor")]
    pub score_divisor: f64,

    #[serde(default = "default_warning_score")]
    pub warning_score: f64,

    #[serde(default = "default_critical_score")]
    pub critical_score: f64,

    /// Per-metric z-score that triggers a recommendation
    #[serde(default = "default_recommendation_z")]
    pub recommendation_z: f64,

    /// Mean vibration/temperature z-score marking a baseline reading anomalous
    #[serde(default = "default_historical_anomaly_z")]
    pub historical_anomaly_z: f64,
}

fn default_min_history() -> usize { defaults::MIN_HISTORY_FOR_ANALYSIS }
fn default_history_limit() -> usize { defaults::ANALYSIS_HISTORY_LIMIT }
fn default_vibration_weight() -> f64 { defaults::VIBRATION_WEIGHT }
fn default_temperature_weight() -> f64 { defaults::TEMPERATURE_WEIGHT }
fn default_rotation_weight() -> f64 { defaults::ROTATION_WEIGHT }
fn default_score_divisor() -> f64 { defaults::SCORE_DIVISOR }
fn default_warning_score() -> f64 { defaults::WARNING_SCORE }
fn default_critical_score() -> f64 { defaults::CRITICAL_SCORE }
fn default_recommendation_z() -> f64 { defaults::RECOMMENDATION_Z }
fn default_historical_anomaly_z() -> f64 { defaults::HISTORICAL_ANOMALY_Z }

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_history: default_min_history(),
            history_limit: default_history_limit(),
            vibration_weight: default_vibration_weight(),
            temperature_weight: default_temperature_weight(),
            rotation_weight: default_rotation_weight(),
            score_divisor: default_score_divisor(),
            warning_score: default_warning_score(),
            critical_score: default_critical_score(),
            recommendation_z: default_recommendation_z(),
            historical_anomaly_z: default_historical_anomaly_z(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Values per sub-window
    #[serde(default = "default_trend_window")]
    pub window: usize,

    /// Percent change treated as noise
    #[serde(default = "default_trend_band")]
    pub band_percent: f64,
}

fn default_trend_window() -> usize { defaults::TREND_WINDOW }
fn default_trend_band() -> f64 { defaults::TREND_BAND_PERCENT }

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window: default_trend_window(),
            band_percent: default_trend_band(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_threshold_interval")]
    pub threshold_interval_secs: u64,

    #[serde(default = "default_analysis_interval")]
    pub analysis_interval_secs: u64,

    /// Suppression window for repeated alerts (seconds)
    #[serde(default = "default_alert_dedup")]
    pub alert_dedup_secs: u64,
}

fn default_threshold_interval() -> u64 { defaults::THRESHOLD_CHECK_INTERVAL_SECS }
fn default_analysis_interval() -> u64 { defaults::ANALYSIS_INTERVAL_SECS }
fn default_alert_dedup() -> u64 { defaults::ALERT_DEDUP_WINDOW_SECS }

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threshold_interval_secs: default_threshold_interval(),
            analysis_interval_secs: default_analysis_interval(),
            alert_dedup_secs: default_alert_dedup(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PlantWatchConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = PlantWatchConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlantWatchConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = PlantWatchConfig::from_toml_str(
            r#"
[window]
size = 64
"#,
        )
        .unwrap();
        assert_eq!(config.window.size, 64);
        assert!((config.window.ema_alpha - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.detection.min_history, 10);
    }

    #[test]
    fn inverted_scores_are_rejected() {
        let mut config = PlantWatchConfig::default();
        config.detection.warning_score = 3.0;
        config.detection.critical_score = 2.0;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("critical_score")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn alpha_outside_unit_interval_is_rejected() {
        let mut config = PlantWatchConfig::default();
        config.window.ema_alpha = 1.5;
        assert!(config.validate().is_err());
        config.window.ema_alpha = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_collects_every_error() {
        let mut config = PlantWatchConfig::default();
        config.window.size = 0;
        config.trend.window = 0;
        config.thresholds.vibration_critical_multiplier = 0.5;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn toml_roundtrip_preserves_values() {
        let mut config = PlantWatchConfig::default();
        config.site.name = "Line-4".to_string();
        config.monitor.analysis_interval_secs = 600;
        let text = config.to_toml().unwrap();
        let parsed = PlantWatchConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
