//! Alert deduplication: one alert per (machine, metric, severity) per window

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::config::MonitorConfig;
use crate::types::{AlertRecord, MetricKind, ViolationSeverity};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub machine_id: String,
    pub metric: MetricKind,
    pub severity: ViolationSeverity,
}

impl AlertKey {
    pub fn new(machine_id: impl Into<String>, metric: MetricKind, severity: ViolationSeverity) -> Self {
        Self {
            machine_id: machine_id.into(),
            metric,
            severity,
        }
    }
}

impl From<&AlertRecord> for AlertKey {
    fn from(record: &AlertRecord) -> Self {
        Self::new(record.machine_id.clone(), record.metric, record.severity)
    }
}

impl std::fmt::Display for AlertKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.machine_id, self.metric, self.severity)
    }
}

/// Last emission time per key; entries older than the TTL are expired.
#[derive(Debug, Clone)]
pub struct AlertDeduplicator {
    ttl: Duration,
    last_emitted: HashMap<AlertKey, DateTime<Utc>>,
}

impl AlertDeduplicator {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            last_emitted: HashMap::new(),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        let secs = i64::try_from(config.alert_dedup_secs).unwrap_or(i64::MAX);
        Self::new(Duration::try_seconds(secs).unwrap_or(Duration::MAX))
    }

    /// True when `key` was emitted less than the TTL before `now`.
    pub fn is_suppressed(&self, key: &AlertKey, now: DateTime<Utc>) -> bool {
        let suppressed = self
            .last_emitted
            .get(key)
            .is_some_and(|last| now.signed_duration_since(*last) < self.ttl);
        if suppressed {
            debug!(key = %key, "Suppressing duplicate alert");
        }
        suppressed
    }

    /// Mark `key` as emitted at `now`. Call only once delivery succeeded.
    pub fn record(&mut self, key: AlertKey, now: DateTime<Utc>) {
        self.last_emitted.insert(key, now);
    }

    /// [`is_suppressed`](Self::is_suppressed) and [`record`](Self::record)
    /// in one step, for callers whose delivery cannot fail.
    pub fn should_emit(&mut self, key: &AlertKey, now: DateTime<Utc>) -> bool {
        if self.is_suppressed(key, now) {
            return false;
        }
        self.record(key.clone(), now);
        true
    }

    /// Drop expired entries; returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.last_emitted.len();
        let ttl = self.ttl;
        self.last_emitted
            .retain(|_, last| now.signed_duration_since(*last) < ttl);
        before - self.last_emitted.len()
    }

    pub fn len(&self) -> usize {
        self.last_emitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_emitted.is_empty()
    }
}
