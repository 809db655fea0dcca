//! Sensor telemetry types: raw IMU counts, physical readings, history records

use serde::{Deserialize, Serialize};

/// One raw telemetry record as produced by the ingest path.
///
/// Accelerometer and gyroscope values are signed LSB counts straight from the
/// IMU registers; environmental channels are already in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Accelerometer X (LSB)
    pub ax: i32,
    /// Accelerometer Y (LSB)
    pub ay: i32,
    /// Accelerometer Z (LSB)
    pub az: i32,
    /// Gyroscope X (LSB)
    pub gx: i32,
    /// Gyroscope Y (LSB)
    pub gy: i32,
    /// Gyroscope Z (LSB)
    pub gz: i32,
    /// Temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Pressure in machine-native units (bar)
    pub pressure: f64,
    /// Capture time (milliseconds since epoch)
    pub timestamp_ms: i64,
}

/// A raw sample tagged with the machine it was captured on.
///
/// This is the line format of the JSON ingest stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedSample {
    pub machine_id: String,
    #[serde(flatten)]
    pub sample: RawSample,
}

/// Three-axis vector in physical units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean magnitude
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Physical-unit view of a [`RawSample`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalReading {
    /// Acceleration per axis (g)
    pub acceleration: Vector3,
    /// Rotation rate per axis (°/s)
    pub rotation: Vector3,
    /// Total acceleration magnitude (g)
    pub total_acceleration_g: f64,
    /// Total rotation magnitude (°/s)
    pub total_rotation_dps: f64,
    /// Acceleration magnitude with the static gravity component removed (g)
    pub vibration_g: f64,
    pub timestamp_ms: i64,
}

/// One entry of a machine's reading history.
///
/// Field names follow the document-store shape the surrounding application
/// exchanges (`vibrationRMS`, `gyroscopeX`, ...). Missing fields read as 0.
/// Histories are handed to the analysis core newest-first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorReading {
    /// Capture time (milliseconds since epoch)
    pub timestamp: i64,
    /// Acceleration X (g)
    pub vibration_x: f64,
    /// Acceleration Y (g)
    pub vibration_y: f64,
    /// Acceleration Z (g)
    pub vibration_z: f64,
    /// Vibration RMS (g)
    #[serde(rename = "vibrationRMS")]
    pub vibration_rms: f64,
    /// Rotation rate X (°/s)
    pub gyroscope_x: f64,
    /// Rotation rate Y (°/s)
    pub gyroscope_y: f64,
    /// Rotation rate Z (°/s)
    pub gyroscope_z: f64,
    /// Temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Pressure (bar)
    pub pressure: f64,
}

impl SensorReading {
    /// Total rotation magnitude across the three gyroscope axes (°/s)
    pub fn rotation_magnitude(&self) -> f64 {
        Vector3::new(self.gyroscope_x, self.gyroscope_y, self.gyroscope_z).magnitude()
    }
}
