//! Threshold alerting: limit evaluation, efficiency scoring, alert records
//! and deduplication

mod alerts;
pub mod dedup;
pub mod efficiency;
pub mod evaluator;

pub use dedup::{AlertDeduplicator, AlertKey};
pub use efficiency::{fleet_efficiency, machine_efficiency, reading_score, try_machine_efficiency};
pub use evaluator::{risk_score, EvaluatedValues, ThresholdEvaluator};
