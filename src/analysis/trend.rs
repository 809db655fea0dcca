//! Trend classification: recent sub-window vs the sub-window before it

use crate::config::{defaults, TrendConfig};
use crate::types::Trend;

use super::statistics::mean;

/// Classifies the direction of a chronologically ordered series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendAnalyzer {
    window: usize,
    band_percent: f64,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(defaults::TREND_WINDOW, defaults::TREND_BAND_PERCENT)
    }
}

impl TrendAnalyzer {
    pub fn new(window: usize, band_percent: f64) -> Self {
        Self {
            window: window.max(1),
            band_percent,
        }
    }

    pub fn from_config(config: &TrendConfig) -> Self {
        Self::new(config.window, config.band_percent)
    }

    /// Classify `values` (oldest first).
    ///
    /// The last `window` values are compared against up to `window` values
    /// immediately before them. Fewer than `window` values, no older values,
    /// or an older average of zero all read as stable.
    pub fn classify(&self, values: &[f64]) -> Trend {
        let len = values.len();
        if len < self.window {
            return Trend::Stable;
        }

        let split = len - self.window;
        let recent = &values[split..];
        let older = &values[split.saturating_sub(self.window)..split];
        if older.is_empty() {
            return Trend::Stable;
        }

        let recent_avg = mean(recent);
        let older_avg = mean(older);
        if older_avg == 0.0 {
            return Trend::Stable;
        }

        let change_percent = 100.0 * (recent_avg - older_avg) / older_avg.abs();
        if change_percent > self.band_percent {
            Trend::Increasing
        } else if change_percent < -self.band_percent {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}
