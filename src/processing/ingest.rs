//! Raw sample ingestion: conversion, per-stream windowing and a bounded
//! reading history per machine
//!
//! The ingestor is the only owner of its stream states. Run one ingestor per
//! ingest task; samples for the same machine must arrive through the same
//! ingestor.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use super::{Channel, StreamRegistry, UnitConverter, WindowStats};
use crate::config::PlantWatchConfig;
use crate::types::{PhysicalReading, SensorReading, TaggedSample};

/// Everything derived from one ingested sample.
#[derive(Debug, Clone, Serialize)]
pub struct IngestedSample {
    pub machine_id: String,
    /// History record appended for the machine
    pub reading: SensorReading,
    pub physical: PhysicalReading,
    pub window: WindowStats,
    pub smoothed_vibration: f64,
    pub smoothed_rotation: f64,
}

pub struct SampleIngestor {
    converter: UnitConverter,
    streams: StreamRegistry,
    histories: HashMap<String, VecDeque<SensorReading>>,
    history_capacity: usize,
}

impl SampleIngestor {
    pub fn new(converter: UnitConverter, streams: StreamRegistry, history_capacity: usize) -> Self {
        Self {
            converter,
            streams,
            histories: HashMap::new(),
            history_capacity: history_capacity.max(1),
        }
    }

    pub fn from_config(config: &PlantWatchConfig) -> Self {
        Self::new(
            UnitConverter::from_config(&config.sensor),
            StreamRegistry::from_config(&config.window),
            config.detection.history_limit,
        )
    }

    /// Convert a sample, update its machine's stream and append a history record.
    ///
    /// The record's `vibrationRMS` is the window RMS of the gravity-corrected
    /// magnitude; gyroscope fields are in °/s.
    pub fn ingest(&mut self, tagged: &TaggedSample) -> IngestedSample {
        let sample = &tagged.sample;
        let physical = self.converter.convert(sample);

        let stream = self.streams.stream_mut(&tagged.machine_id);
        let window = stream.push_sample(physical.vibration_g);
        let smoothed_vibration = stream.smooth(physical.vibration_g, Channel::Vibration);
        let smoothed_rotation = stream.smooth(physical.total_rotation_dps, Channel::Rotation);

        let reading = SensorReading {
            timestamp: sample.timestamp_ms,
            vibration_x: physical.acceleration.x,
            vibration_y: physical.acceleration.y,
            vibration_z: physical.acceleration.z,
            vibration_rms: window.rms,
            gyroscope_x: physical.rotation.x,
            gyroscope_y: physical.rotation.y,
            gyroscope_z: physical.rotation.z,
            temperature: sample.temperature,
            humidity: sample.humidity,
            pressure: sample.pressure,
        };

        let history = self.histories.entry(tagged.machine_id.clone()).or_default();
        history.push_front(reading);
        history.truncate(self.history_capacity);

        IngestedSample {
            machine_id: tagged.machine_id.clone(),
            reading,
            physical,
            window,
            smoothed_vibration,
            smoothed_rotation,
        }
    }

    /// Reading history of a machine, newest first.
    pub fn history(&self, machine_id: &str) -> Vec<SensorReading> {
        self.histories
            .get(machine_id)
            .map(|h| h.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Machines seen so far
    pub fn machine_ids(&self) -> impl Iterator<Item = &str> {
        self.histories.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawSample;

    fn tagged(machine: &str, az: i32, ts: i64) -> TaggedSample {
        TaggedSample {
            machine_id: machine.to_string(),
            sample: RawSample {
                ax: 0,
                ay: 0,
                az,
                gx: 262,
                gy: 0,
                gz: 0,
                temperature: 41.0,
                humidity: 35.0,
                pressure: 2.0,
                timestamp_ms: ts,
            },
        }
    }

    #[test]
    fn history_is_newest_first_and_bounded() {
        let mut ingestor = SampleIngestor::new(UnitConverter::default(), StreamRegistry::new(8, 0.2), 3);
        for ts in 0..5 {
            ingestor.ingest(&tagged("m1", 16_384, ts));
        }
        let history = ingestor.history("m1");
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].timestamp, 4);
        assert_eq!(history[2].timestamp, 2);
    }

    #[test]
    fn reading_carries_window_rms_and_rotation_in_dps() {
        let mut ingestor = SampleIngestor::new(UnitConverter::default(), StreamRegistry::new(8, 0.2), 10);
        // 1.5 g on Z → 0.5 g of vibration
        let out = ingestor.ingest(&tagged("m1", 24_576, 1));
        assert!((out.physical.vibration_g - 0.5).abs() < 1e-12);
        assert!((out.reading.vibration_rms - 0.5).abs() < 1e-12);
        assert!((out.reading.gyroscope_x - 2.0).abs() < 1e-12);
        assert!((out.smoothed_vibration - 0.1).abs() < 1e-12);
        assert!((out.smoothed_rotation - 0.4).abs() < 1e-12);
    }

    #[test]
    fn configured_gyro_bias_reaches_history() {
        let mut config = PlantWatchConfig::default();
        config.sensor.gyro_bias_dps = [2.0, 0.0, 0.0];
        let mut ingestor = SampleIngestor::from_config(&config);
        let out = ingestor.ingest(&tagged("m1", 16_384, 1));
        assert!(out.reading.gyroscope_x.abs() < 1e-12);
        assert!(out.physical.total_rotation_dps.abs() < 1e-12);
    }

    #[test]
    fn machines_do_not_share_windows() {
        let mut ingestor = SampleIngestor::new(UnitConverter::default(), StreamRegistry::new(8, 0.2), 10);
        ingestor.ingest(&tagged("m1", 32_768, 1));
        let quiet = ingestor.ingest(&tagged("m2", 16_384, 1));
        assert_eq!(quiet.window.samples, 1);
        assert!(quiet.reading.vibration_rms.abs() < 1e-12);
        assert_eq!(ingestor.machine_ids().count(), 2);
    }
}
