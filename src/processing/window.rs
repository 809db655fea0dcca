//! Rolling vibration window and EMA smoothing, one state object per stream
//!
//! Each monitored stream (machine or machine/sensor pair) owns a
//! [`StreamState`]: a bounded FIFO of vibration magnitudes plus two
//! exponential moving averages. Nothing here is shared between streams;
//! mutation goes through `&mut self`, so concurrent writers to one stream are
//! ruled out at compile time and different streams can be processed in
//! parallel.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::config::{defaults, WindowConfig};

/// RMS, peak and crest factor over the current window contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub rms: f64,
    pub peak: f64,
    /// `peak / rms`, 0 when `rms` is 0
    pub crest_factor: f64,
    /// Values currently in the window
    pub samples: usize,
}

/// Bounded FIFO of vibration magnitudes.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest once over capacity, and return
    /// statistics over the retained values.
    pub fn push(&mut self, value: f64) -> WindowStats {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
        self.stats()
    }

    pub fn stats(&self) -> WindowStats {
        if self.values.is_empty() {
            return WindowStats::default();
        }
        let n = self.values.len() as f64;
        let sum_squares: f64 = self.values.iter().map(|v| v * v).sum();
        let rms = (sum_squares / n).sqrt();
        let peak = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let crest_factor = if rms == 0.0 { 0.0 } else { peak / rms };

        WindowStats {
            rms,
            peak,
            crest_factor,
            samples: self.values.len(),
        }
    }

    /// Retained values, oldest first
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Exponential moving average: `new = α·sample + (1 − α)·old`, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    alpha: f64,
    value: f64,
}

impl Ema {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(f64::MIN_POSITIVE, 1.0),
            value: 0.0,
        }
    }

    pub fn update(&mut self, sample: f64) -> f64 {
        self.value = self.alpha * sample + (1.0 - self.alpha) * self.value;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Which EMA accumulator a value is smoothed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Gravity-corrected acceleration magnitude
    Vibration,
    /// Total rotation magnitude
    Rotation,
}

/// Window plus smoothing state of a single stream.
#[derive(Debug, Clone)]
pub struct StreamState {
    window: RollingWindow,
    vibration_ema: Ema,
    rotation_ema: Ema,
}

impl StreamState {
    pub fn new(window_size: usize, alpha: f64) -> Self {
        Self {
            window: RollingWindow::new(window_size),
            vibration_ema: Ema::new(alpha),
            rotation_ema: Ema::new(alpha),
        }
    }

    pub fn from_config(config: &WindowConfig) -> Self {
        Self::new(config.size, config.ema_alpha)
    }

    pub fn push_sample(&mut self, vibration_magnitude: f64) -> WindowStats {
        self.window.push(vibration_magnitude)
    }

    pub fn smooth(&mut self, value: f64, channel: Channel) -> f64 {
        match channel {
            Channel::Vibration => self.vibration_ema.update(value),
            Channel::Rotation => self.rotation_ema.update(value),
        }
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    pub fn smoothed(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Vibration => self.vibration_ema.value(),
            Channel::Rotation => self.rotation_ema.value(),
        }
    }
}

impl Default for StreamState {
    fn default() -> Self {
        Self::new(defaults::WINDOW_SIZE, defaults::EMA_ALPHA)
    }
}

/// Stream key → state. States are created on first use.
#[derive(Debug, Clone)]
pub struct StreamRegistry {
    streams: HashMap<String, StreamState>,
    window_size: usize,
    alpha: f64,
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new(defaults::WINDOW_SIZE, defaults::EMA_ALPHA)
    }
}

impl StreamRegistry {
    pub fn new(window_size: usize, alpha: f64) -> Self {
        Self {
            streams: HashMap::new(),
            window_size,
            alpha,
        }
    }

    pub fn from_config(config: &WindowConfig) -> Self {
        Self::new(config.size, config.ema_alpha)
    }

    /// State for `key`, created if missing.
    pub fn stream_mut(&mut self, key: &str) -> &mut StreamState {
        let (window_size, alpha) = (self.window_size, self.alpha);
        self.streams.entry(key.to_string()).or_insert_with(|| {
            tracing::debug!(stream = key, window = window_size, "Creating stream state");
            StreamState::new(window_size, alpha)
        })
    }

    pub fn stream(&self, key: &str) -> Option<&StreamState> {
        self.streams.get(key)
    }

    pub fn push_sample(&mut self, key: &str, vibration_magnitude: f64) -> WindowStats {
        self.stream_mut(key).push_sample(vibration_magnitude)
    }

    pub fn smooth(&mut self, key: &str, value: f64, channel: Channel) -> f64 {
        self.stream_mut(key).smooth(value, channel)
    }

    /// Drop a stream's state, e.g. when a machine is decommissioned.
    pub fn remove(&mut self, key: &str) -> Option<StreamState> {
        self.streams.remove(key)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_never_exceeds_capacity_and_keeps_latest_in_order() {
        let mut window = RollingWindow::new(5);
        for i in 0..12 {
            window.push(f64::from(i));
            assert!(window.len() <= 5);
        }
        let kept: Vec<f64> = window.values().collect();
        assert_eq!(kept, vec![7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn rms_peak_and_crest_factor() {
        let mut window = RollingWindow::new(10);
        window.push(3.0);
        let stats = window.push(4.0);
        // sqrt((9 + 16) / 2)
        let expected_rms = 12.5_f64.sqrt();
        assert!((stats.rms - expected_rms).abs() < 1e-12);
        assert_eq!(stats.peak, 4.0);
        assert!((stats.crest_factor - 4.0 / expected_rms).abs() < 1e-12);
        assert_eq!(stats.samples, 2);
    }

    #[test]
    fn crest_factor_is_zero_when_rms_is_zero() {
        let mut window = RollingWindow::new(3);
        window.push(0.0);
        let stats = window.push(0.0);
        assert_eq!(stats.rms, 0.0);
        assert_eq!(stats.crest_factor, 0.0);
    }

    #[test]
    fn statistics_reflect_only_window_contents() {
        let mut window = RollingWindow::new(2);
        window.push(100.0);
        window.push(1.0);
        let stats = window.push(1.0);
        assert_eq!(stats.peak, 1.0);
        assert!((stats.rms - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ema_follows_recurrence() {
        let mut ema = Ema::new(0.2);
        assert!((ema.update(10.0) - 2.0).abs() < 1e-12);
        assert!((ema.update(10.0) - 3.6).abs() < 1e-12);
    }

    #[test]
    fn channels_are_smoothed_independently() {
        let mut state = StreamState::new(10, 0.5);
        state.smooth(4.0, Channel::Vibration);
        let rotation = state.smooth(8.0, Channel::Rotation);
        assert!((state.smoothed(Channel::Vibration) - 2.0).abs() < 1e-12);
        assert!((rotation - 4.0).abs() < 1e-12);
    }

    #[test]
    fn registry_keeps_streams_apart() {
        let mut registry = StreamRegistry::new(3, 0.2);
        registry.push_sample("press-1", 1.0);
        registry.push_sample("press-1", 1.0);
        let other = registry.push_sample("lathe-7", 9.0);
        assert_eq!(registry.len(), 2);
        assert_eq!(other.samples, 1);
        assert_eq!(other.peak, 9.0);
        assert_eq!(registry.stream("press-1").map(|s| s.window().len()), Some(2));
    }
}
