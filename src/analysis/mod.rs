//! Predictive analysis: baseline statistics, anomaly detection, trends,
//! health and maintenance scheduling

pub mod anomaly;
pub mod health;
pub mod machine;
pub mod maintenance;
pub mod statistics;
pub mod trend;

pub use anomaly::{AnomalyDetector, BaselineEvaluation, TrendContext};
pub use health::overall_health;
pub use machine::MachineAnalyzer;
pub use maintenance::{plan as maintenance_plan, MaintenancePlan, MaintenanceScheduler};
pub use statistics::{z_score, Baseline};
pub use trend::TrendAnalyzer;
