//! Unit conversion for raw IMU counts
//!
//! Converts accelerometer and gyroscope LSB counts to g and °/s, computes
//! magnitudes and strips the static gravity component from the acceleration
//! magnitude so that what remains is vibration. Assumes a roughly upright,
//! low-tilt sensor mount.

use crate::config::{defaults, SensorConfig};
use crate::types::{PhysicalReading, RawSample, Vector3};

/// Euclidean magnitude of a three-axis quantity.
pub fn total_magnitude(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt()
}

/// Root-mean-square across three axes: `sqrt((x² + y² + z²) / 3)`.
pub fn triaxial_rms(x: f64, y: f64, z: f64) -> f64 {
    ((x * x + y * y + z * z) / 3.0).sqrt()
}

/// Static gyroscope offset per axis (°/s), measured with the machine at rest.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GyroBias(pub Vector3);

impl GyroBias {
    /// Average rotation rate over samples captured at rest.
    ///
    /// An empty slice yields a zero bias.
    pub fn calibrate(samples: &[(i32, i32, i32)], gyro_scale_lsb_per_dps: f64) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let (sx, sy, sz) = samples.iter().fold((0.0, 0.0, 0.0), |acc, &(gx, gy, gz)| {
            (
                acc.0 + f64::from(gx) / gyro_scale_lsb_per_dps,
                acc.1 + f64::from(gy) / gyro_scale_lsb_per_dps,
                acc.2 + f64::from(gz) / gyro_scale_lsb_per_dps,
            )
        });
        Self(Vector3::new(sx / n, sy / n, sz / n))
    }
}

impl From<[f64; 3]> for GyroBias {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self(Vector3::new(x, y, z))
    }
}

impl From<GyroBias> for [f64; 3] {
    fn from(bias: GyroBias) -> Self {
        [bias.0.x, bias.0.y, bias.0.z]
    }
}

/// Converts raw IMU counts into physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    accel_scale: f64,
    gyro_scale: f64,
    gravity_g: f64,
    gyro_bias: GyroBias,
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self {
            accel_scale: defaults::ACCEL_SCALE_LSB_PER_G,
            gyro_scale: defaults::GYRO_SCALE_LSB_PER_DPS,
            gravity_g: defaults::GRAVITY_G,
            gyro_bias: GyroBias::default(),
        }
    }
}

impl UnitConverter {
    pub fn from_config(config: &SensorConfig) -> Self {
        Self {
            accel_scale: config.accel_scale_lsb_per_g,
            gyro_scale: config.gyro_scale_lsb_per_dps,
            gravity_g: config.gravity_g,
            gyro_bias: GyroBias::from(config.gyro_bias_dps),
        }
    }

    /// Subtract a calibrated gyroscope offset from every rotation conversion.
    pub fn with_gyro_bias(mut self, bias: GyroBias) -> Self {
        self.gyro_bias = bias;
        self
    }

    pub fn gyro_scale(&self) -> f64 {
        self.gyro_scale
    }

    /// Accelerometer counts to g.
    pub fn to_physical_acceleration(&self, ax: i32, ay: i32, az: i32) -> Vector3 {
        Vector3::new(
            f64::from(ax) / self.accel_scale,
            f64::from(ay) / self.accel_scale,
            f64::from(az) / self.accel_scale,
        )
    }

    /// Gyroscope counts to °/s, bias removed.
    pub fn to_physical_rotation(&self, gx: i32, gy: i32, gz: i32) -> Vector3 {
        let bias = self.gyro_bias.0;
        Vector3::new(
            f64::from(gx) / self.gyro_scale - bias.x,
            f64::from(gy) / self.gyro_scale - bias.y,
            f64::from(gz) / self.gyro_scale - bias.z,
        )
    }

    /// `|total − gravity|`: acceleration magnitude with gravity removed.
    pub fn vibration_magnitude(&self, total_acceleration_g: f64) -> f64 {
        (total_acceleration_g - self.gravity_g).abs()
    }

    /// Full conversion of one raw sample.
    pub fn convert(&self, sample: &RawSample) -> PhysicalReading {
        let acceleration = self.to_physical_acceleration(sample.ax, sample.ay, sample.az);
        let rotation = self.to_physical_rotation(sample.gx, sample.gy, sample.gz);
        let total_acceleration_g = total_magnitude(acceleration.x, acceleration.y, acceleration.z);
        let total_rotation_dps = total_magnitude(rotation.x, rotation.y, rotation.z);

        PhysicalReading {
            acceleration,
            rotation,
            total_acceleration_g,
            total_rotation_dps,
            vibration_g: self.vibration_magnitude(total_acceleration_g),
            timestamp_ms: sample.timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ax: i32, ay: i32, az: i32, gx: i32, gy: i32, gz: i32) -> RawSample {
        RawSample {
            ax,
            ay,
            az,
            gx,
            gy,
            gz,
            temperature: 25.0,
            humidity: 40.0,
            pressure: 1.0,
            timestamp_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn one_g_on_z_axis_has_no_vibration() {
        let converter = UnitConverter::default();
        let reading = converter.convert(&sample(0, 0, 16_384, 0, 0, 0));
        assert!((reading.acceleration.z - 1.0).abs() < 1e-12);
        assert!((reading.total_acceleration_g - 1.0).abs() < 1e-12);
        assert!(reading.vibration_g.abs() < 1e-12);
    }

    #[test]
    fn vibration_is_distance_from_gravity() {
        let converter = UnitConverter::default();
        assert!((converter.vibration_magnitude(1.25) - 0.25).abs() < 1e-12);
        assert!((converter.vibration_magnitude(0.75) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn gyro_counts_convert_to_degrees_per_second() {
        let converter = UnitConverter::default();
        let rotation = converter.to_physical_rotation(131, -262, 0);
        assert!((rotation.x - 1.0).abs() < 1e-12);
        assert!((rotation.y + 2.0).abs() < 1e-12);
        assert_eq!(rotation.z, 0.0);
    }

    #[test]
    fn magnitude_of_3_4_0_is_5() {
        assert!((total_magnitude(3.0, 4.0, 0.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn triaxial_rms_of_equal_axes_is_axis_value() {
        assert!((triaxial_rms(2.0, 2.0, 2.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn gyro_bias_is_removed_after_calibration() {
        let rest = [(131, 0, -131), (131, 0, -131)];
        let bias = GyroBias::calibrate(&rest, defaults::GYRO_SCALE_LSB_PER_DPS);
        assert!((bias.0.x - 1.0).abs() < 1e-12);
        assert!((bias.0.z + 1.0).abs() < 1e-12);

        let converter = UnitConverter::default().with_gyro_bias(bias);
        let rotation = converter.to_physical_rotation(131, 0, -131);
        assert!(rotation.magnitude() < 1e-12);
    }

    #[test]
    fn configured_bias_is_applied() {
        let config = SensorConfig {
            gyro_bias_dps: [1.0, 0.0, -1.0],
            ..SensorConfig::default()
        };
        let rotation = UnitConverter::from_config(&config).to_physical_rotation(131, 131, -131);
        assert!(rotation.x.abs() < 1e-12);
        assert!((rotation.y - 1.0).abs() < 1e-12);
        assert!(rotation.z.abs() < 1e-12);
    }

    #[test]
    fn empty_calibration_is_zero_bias() {
        let bias = GyroBias::calibrate(&[], defaults::GYRO_SCALE_LSB_PER_DPS);
        assert_eq!(bias, GyroBias::default());
    }
}
