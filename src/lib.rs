//! PlantWatch: predictive maintenance for industrial machine telemetry
//!
//! Turns raw IMU and environmental samples into physical readings, checks
//! them against per-machine limits, and runs statistical analysis over each
//! machine's history to catch degradation before it becomes a failure.
//!
//! ## Architecture
//!
//! - **Processing**: raw counts to physical units, rolling vibration windows, EMA smoothing
//! - **Alerting**: threshold evaluation, efficiency scoring, alert deduplication
//! - **Analysis**: baseline z-scores, trend classification, health and maintenance scheduling
//! - **Monitor**: periodic threshold and analysis passes over a fleet

pub mod alerting;
pub mod analysis;
pub mod config;
pub mod monitor;
pub mod processing;
pub mod types;

// Re-export configuration
pub use config::PlantWatchConfig;

// Re-export commonly used types
pub use types::{
    AlertRecord, AnalysisOutcome, AnomalyResult, FleetReport, HealthStatus, Machine,
    MachineAnalysis, MachineThresholds, MaintenanceSchedule, MetricKind, Priority, RawSample,
    SensorReading, Severity, TaggedSample, ThresholdViolation, Trend, TrendAnalysis,
    ViolationSeverity,
};

// Re-export the processing and analysis entry points
pub use alerting::{AlertDeduplicator, ThresholdEvaluator};
pub use analysis::{AnomalyDetector, MachineAnalyzer, MaintenanceScheduler, TrendAnalyzer};
pub use monitor::{AlertSink, FleetMonitor, HistorySource};
pub use processing::{SampleIngestor, UnitConverter};
