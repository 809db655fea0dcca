//! Machine identity and configured physical limits

use serde::{Deserialize, Serialize};

use super::SensorReading;

/// Configured limits for one machine.
///
/// A limit of zero or below means "not configured" and is never evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineThresholds {
    /// Maximum pressure (PSI)
    #[serde(rename = "maxPressurePSI", default)]
    pub max_pressure_psi: f64,
    /// Maximum temperature (°C)
    #[serde(default)]
    pub max_temperature: f64,
    /// Maximum relative humidity (%)
    #[serde(default)]
    pub max_humidity: f64,
    /// Maximum vibration acceleration (m/s²)
    #[serde(default)]
    pub max_acceleration: f64,
    /// Maximum rotation rate (°/s)
    #[serde(default)]
    pub max_gyroscope: f64,
}

/// A monitored machine as supplied by the configuration store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub thresholds: Option<MachineThresholds>,
}

impl Machine {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            thresholds: None,
        }
    }

    pub fn with_thresholds(mut self, thresholds: MachineThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }
}

/// A machine together with its reading history (newest first).
///
/// This is the record shape of a fleet snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineRecord {
    #[serde(flatten)]
    pub machine: Machine,
    #[serde(default)]
    pub readings: Vec<SensorReading>,
}

/// Snapshot of a whole fleet: every machine and its recent readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    #[serde(default)]
    pub machines: Vec<MachineRecord>,
}
