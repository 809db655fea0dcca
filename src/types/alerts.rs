//! Threshold violations and alert records

use serde::{Deserialize, Serialize};

/// Metric a configured limit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Vibration,
    Temperature,
    Pressure,
    Humidity,
}

impl MetricKind {
    /// Display label used in alert messages
    pub const fn label(self) -> &'static str {
        match self {
            MetricKind::Vibration => "Vibration",
            MetricKind::Temperature => "Temperature",
            MetricKind::Pressure => "Pressure",
            MetricKind::Humidity => "Humidity",
        }
    }

    /// Unit the evaluated value is expressed in
    pub const fn unit(self) -> &'static str {
        match self {
            MetricKind::Vibration => "m/s²",
            MetricKind::Temperature => "°C",
            MetricKind::Pressure => "PSI",
            MetricKind::Humidity => "%",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricKind::Vibration => write!(f, "vibration"),
            MetricKind::Temperature => write!(f, "temperature"),
            MetricKind::Pressure => write!(f, "pressure"),
            MetricKind::Humidity => write!(f, "humidity"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    Warning,
    Critical,
}

impl std::fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationSeverity::Warning => write!(f, "warning"),
            ViolationSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// One exceeded limit on one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdViolation {
    pub metric: MetricKind,
    /// Observed value, in the unit of [`MetricKind::unit`]
    pub value: f64,
    /// Configured limit it was compared against
    pub threshold: f64,
    pub severity: ViolationSeverity,
}

/// Alert document handed to the alert store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub machine_id: String,
    pub machine_name: String,
    #[serde(rename = "type")]
    pub metric: MetricKind,
    pub severity: ViolationSeverity,
    pub message: String,
    /// Milliseconds since epoch
    pub timestamp: i64,
    pub acknowledged: bool,
}
