//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery. Every tunable here has a matching
//! field in [`PlantWatchConfig`](super::PlantWatchConfig).

// ============================================================================
// Sensor (MPU-6050 class IMU)
// ============================================================================

/// Accelerometer sensitivity at the ±2 g range (LSB/g).
pub const ACCEL_SCALE_LSB_PER_G: f64 = 16_384.0;

/// Gyroscope sensitivity at the ±250 °/s range (LSB per °/s).
pub const GYRO_SCALE_LSB_PER_DPS: f64 = 131.0;

/// Static gravity reference removed from the acceleration magnitude (g).
pub const GRAVITY_G: f64 = 1.0;

// ============================================================================
// Unit conversions
// ============================================================================

/// Standard gravity (m/s² per g).
pub const STANDARD_GRAVITY_MS2: f64 = 9.81;

/// Pressure conversion (PSI per bar).
pub const PSI_PER_BAR: f64 = 145.038;

// ============================================================================
// Rolling window
// ============================================================================

/// Vibration samples retained per stream.
pub const WINDOW_SIZE: usize = 500;

/// EMA smoothing factor for magnitude and rotation channels.
pub const EMA_ALPHA: f64 = 0.2;

// ============================================================================
// Threshold evaluation
// ============================================================================

/// Vibration escalates to critical above this multiple of its limit.
pub const VIBRATION_CRITICAL_MULTIPLIER: f64 = 1.5;

/// Temperature, pressure and humidity escalate to critical above this multiple.
pub const ENVIRONMENTAL_CRITICAL_MULTIPLIER: f64 = 1.2;

// ============================================================================
// Anomaly detection
// ============================================================================

/// Minimum history entries (newest included) before a baseline is trusted.
pub const MIN_HISTORY_FOR_ANALYSIS: usize = 10;

/// Readings fetched per machine for a predictive-analysis pass.
pub const ANALYSIS_HISTORY_LIMIT: usize = 100;

/// Weight of the vibration z-score in the combined anomaly score.
pub const VIBRATION_WEIGHT: f64 = 0.5;

/// Weight of the temperature z-score in the combined anomaly score.
pub const TEMPERATURE_WEIGHT: f64 = 0.3;

/// Weight of the rotation z-score in the combined anomaly score.
pub const ROTATION_WEIGHT: f64 = 0.2;

/// Divisor applied to the weighted z-score sum.
pub const SCORE_DIVISOR: f64 = 3.0;

/// Combined score above which a reading is a warning.
pub const WARNING_SCORE: f64 = 1.5;

/// Combined score above which a reading is critical.
pub const CRITICAL_SCORE: f64 = 2.5;

/// Per-metric z-score above which a recommendation is emitted.
pub const RECOMMENDATION_Z: f64 = 2.0;

/// Mean vibration/temperature z-score above which a baseline reading counts as anomalous.
pub const HISTORICAL_ANOMALY_Z: f64 = 1.5;

// ============================================================================
// Trend analysis
// ============================================================================

/// Values per trend sub-window.
pub const TREND_WINDOW: usize = 20;

/// Percent change band treated as noise.
pub const TREND_BAND_PERCENT: f64 = 5.0;

// ============================================================================
// Fleet monitor
// ============================================================================

/// Interval between threshold checks (seconds).
pub const THRESHOLD_CHECK_INTERVAL_SECS: u64 = 30;

/// Interval between full predictive-analysis passes (seconds).
pub const ANALYSIS_INTERVAL_SECS: u64 = 120;

/// An alert with the same machine, metric and severity is suppressed for this long (seconds).
pub const ALERT_DEDUP_WINDOW_SECS: u64 = 300;
