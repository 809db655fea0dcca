//! Analysis outputs: anomaly result, trend analysis, maintenance schedule,
//! consolidated per-machine analysis

use serde::{Deserialize, Serialize};

// ============================================================================
// Closed classifications
// ============================================================================

/// Overall anomaly severity of a machine's newest reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    /// Whether this severity counts as an anomaly
    pub const fn is_anomalous(self) -> bool {
        matches!(self, Self::Warning | Self::Critical)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Normal => f.pad("NORMAL"),
            Severity::Warning => f.pad("WARNING"),
            Severity::Critical => f.pad("CRITICAL"),
        }
    }
}

/// Direction of a metric over the trend window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub const fn is_increasing(self) -> bool {
        matches!(self, Self::Increasing)
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increasing => f.pad("increasing"),
            Trend::Decreasing => f.pad("decreasing"),
            Trend::Stable => f.pad("stable"),
        }
    }
}

/// Maintenance priority, ordered from least to most pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => f.pad("low"),
            Priority::Medium => f.pad("medium"),
            Priority::High => f.pad("high"),
            Priority::Urgent => f.pad("urgent"),
        }
    }
}

/// Machine health status shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl From<Severity> for HealthStatus {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Normal => HealthStatus::Healthy,
            Severity::Warning => HealthStatus::Warning,
            Severity::Critical => HealthStatus::Critical,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => f.pad("healthy"),
            HealthStatus::Warning => f.pad("warning"),
            HealthStatus::Critical => f.pad("critical"),
        }
    }
}

// ============================================================================
// Anomaly detection
// ============================================================================

/// Per-metric z-scores of the newest reading against the historical baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricZScores {
    pub vibration: f64,
    pub temperature: f64,
    pub rotation: f64,
}

/// Result of statistical anomaly detection for one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub is_anomaly: bool,
    pub severity: Severity,
    /// Confidence in the classification, always within [0, 1]
    pub confidence: f64,
    /// Weighted combination of the per-metric z-scores
    pub anomaly_score: f64,
    pub z_scores: MetricZScores,
    /// Ordered, human-readable diagnostic recommendations
    pub recommendations: Vec<String>,
    /// Set when the history was too short to establish a baseline
    #[serde(default)]
    pub insufficient_data: bool,
}

// ============================================================================
// Trend + maintenance
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub vibration_trend: Trend,
    pub temperature_trend: Trend,
    /// Overall health percentage (0-100)
    pub overall_health: u8,
}

/// Recommended maintenance window for a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    pub machine_id: String,
    pub machine_name: String,
    /// Recommended service date (YYYY-MM-DD)
    pub estimated_date: String,
    pub days_until_maintenance: u32,
    pub priority: Priority,
    pub reason: String,
    pub recommendations: Vec<String>,
}

// ============================================================================
// Consolidated analysis
// ============================================================================

/// Summary statistics over the baseline window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSummary {
    /// Mean vibration RMS of the baseline (g)
    pub avg_vibration: f64,
    /// Mean temperature of the baseline (°C)
    pub avg_temperature: f64,
    /// Readings considered, newest included
    pub total_readings: usize,
    /// Baseline readings that were themselves anomalous
    pub anomaly_count: usize,
    /// Local vibration maxima in the baseline above `mean + recommendation_z·σ`
    #[serde(default)]
    pub vibration_peaks: usize,
}

/// Consolidated predictive-maintenance analysis of one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineAnalysis {
    pub machine_id: String,
    pub machine_name: String,
    pub status: HealthStatus,
    pub anomaly: AnomalyResult,
    pub trend: TrendAnalysis,
    pub maintenance: MaintenanceSchedule,
    pub historical: HistoricalSummary,
    /// Proximity of the newest reading to the machine's limits (0-100),
    /// 0 when no limits are configured
    #[serde(default)]
    pub risk_score: u8,
}

/// Outcome of analysing one machine.
///
/// Short histories produce an explicit `InsufficientData` value instead of a
/// low-confidence analysis, so callers have to handle it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Complete(Box<MachineAnalysis>),
    InsufficientData {
        machine_id: String,
        available: usize,
        required: usize,
    },
}

impl AnalysisOutcome {
    pub fn analysis(&self) -> Option<&MachineAnalysis> {
        match self {
            AnalysisOutcome::Complete(analysis) => Some(analysis),
            AnalysisOutcome::InsufficientData { .. } => None,
        }
    }

    pub fn into_analysis(self) -> Option<MachineAnalysis> {
        match self {
            AnalysisOutcome::Complete(analysis) => Some(*analysis),
            AnalysisOutcome::InsufficientData { .. } => None,
        }
    }
}

/// Machines that could not be analysed in a fleet pass, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedMachine {
    pub machine_id: String,
    pub reason: String,
}

/// Result of one predictive-analysis pass over the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub total_machines: usize,
    pub analyzed_machines: usize,
    pub analyses: Vec<MachineAnalysis>,
    pub skipped: Vec<SkippedMachine>,
    /// Fleet-wide efficiency (0-100)
    pub fleet_efficiency: u8,
}
