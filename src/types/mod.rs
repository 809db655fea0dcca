//! Shared data structures for the predictive-maintenance pipeline
//!
//! - `sensor`: RawSample (IMU counts), PhysicalReading, SensorReading (history record)
//! - `machine`: Machine, MachineThresholds, fleet snapshot records
//! - `analysis`: AnomalyResult, TrendAnalysis, MaintenanceSchedule, MachineAnalysis
//! - `alerts`: ThresholdViolation, AlertRecord

mod alerts;
mod analysis;
mod machine;
mod sensor;

pub use alerts::*;
pub use analysis::*;
pub use machine::*;
pub use sensor::*;
