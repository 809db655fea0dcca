//! Maintenance Scheduler - severity and trends to a service window
//!
//! | Severity | Vibration | Temperature | Days | Priority |
//! |----------|-----------|-------------|------|----------|
//! | CRITICAL | inc       | inc         | 2    | urgent   |
//! | CRITICAL | inc       | other       | 3    | urgent   |
//! | CRITICAL | other     | inc         | 5    | urgent   |
//! | CRITICAL | other     | other       | 7    | high     |
//! | WARNING  | inc       | inc         | 7    | high     |
//! | WARNING  | one of them inc         | 14   | medium   |
//! | WARNING  | other     | other       | 21   | medium   |
//! | NORMAL   | any       | any         | 30   | low      |

use chrono::{Days, NaiveDate, Utc};
use tracing::debug;

use crate::types::{MaintenanceSchedule, Priority, Severity, Trend};

/// Days, priority, reason and checklist of one decision-table row.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenancePlan {
    pub days: u32,
    pub priority: Priority,
    pub reason: &'static str,
    pub checklist: &'static [&'static str],
}

/// Decision table lookup.
pub fn plan(severity: Severity, vibration: Trend, temperature: Trend) -> MaintenancePlan {
    match (severity, vibration.is_increasing(), temperature.is_increasing()) {
        (Severity::Critical, true, true) => row(
            2,
            Priority::Urgent,
            "Critical condition with rising vibration and temperature",
            &[
                "Stop the machine as soon as production allows",
                "Inspect bearings and lubrication",
                "Check the cooling system",
            ],
        ),
        (Severity::Critical, true, false) => row(
            3,
            Priority::Urgent,
            "Critical condition with rising vibration",
            &[
                "Inspect bearings and rotating components",
                "Check shaft alignment and balance",
            ],
        ),
        (Severity::Critical, false, true) => row(
            5,
            Priority::Urgent,
            "Critical condition with rising temperature",
            &["Check the cooling system", "Verify lubrication levels"],
        ),
        (Severity::Critical, false, false) => row(
            7,
            Priority::High,
            "Critical anomaly detected",
            &[
                "Run a full diagnostic inspection",
                "Review recent vibration and temperature history",
            ],
        ),
        (Severity::Warning, true, true) => row(
            7,
            Priority::High,
            "Warning condition with rising vibration and temperature",
            &[
                "Inspect bearings and lubrication",
                "Check the cooling system",
            ],
        ),
        (Severity::Warning, true, false) | (Severity::Warning, false, true) => row(
            14,
            Priority::Medium,
            "Warning condition with one rising metric",
            &["Schedule a preventive inspection", "Increase monitoring frequency"],
        ),
        (Severity::Warning, false, false) => row(
            21,
            Priority::Medium,
            "Warning anomaly detected",
            &["Schedule a preventive inspection", "Review recent sensor history for emerging patterns"],
        ),
        (Severity::Normal, _, _) => row(
            30,
            Priority::Low,
            "Routine preventive maintenance",
            &["Perform routine maintenance", "Lubricate moving parts"],
        ),
    }
}

const fn row(
    days: u32,
    priority: Priority,
    reason: &'static str,
    checklist: &'static [&'static str],
) -> MaintenancePlan {
    MaintenancePlan {
        days,
        priority,
        reason,
        checklist,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceScheduler;

impl MaintenanceScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Schedule relative to today's UTC date.
    pub fn schedule(
        &self,
        severity: Severity,
        anomaly_score: f64,
        vibration: Trend,
        temperature: Trend,
    ) -> MaintenanceSchedule {
        self.schedule_on(severity, anomaly_score, vibration, temperature, Utc::now().date_naive())
    }

    /// Schedule relative to `today`. Machine identity is left empty for the
    /// caller to fill.
    pub fn schedule_on(
        &self,
        severity: Severity,
        anomaly_score: f64,
        vibration: Trend,
        temperature: Trend,
        today: NaiveDate,
    ) -> MaintenanceSchedule {
        let plan = plan(severity, vibration, temperature);
        let date = today
            .checked_add_days(Days::new(u64::from(plan.days)))
            .unwrap_or(NaiveDate::MAX);

        debug!(
            severity = %severity,
            score = anomaly_score,
            vibration = %vibration,
            temperature = %temperature,
            days = plan.days,
            priority = %plan.priority,
            "Maintenance scheduled"
        );

        MaintenanceSchedule {
            machine_id: String::new(),
            machine_name: String::new(),
            estimated_date: date.format("%Y-%m-%d").to_string(),
            days_until_maintenance: plan.days,
            priority: plan.priority,
            reason: plan.reason.to_string(),
            recommendations: plan.checklist.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRENDS: [Trend; 3] = [Trend::Increasing, Trend::Decreasing, Trend::Stable];

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn decision_table() {
        use Trend::{Increasing as Inc, Stable as St};
        let cases = [
            (Severity::Critical, Inc, Inc, 2, Priority::Urgent),
            (Severity::Critical, Inc, St, 3, Priority::Urgent),
            (Severity::Critical, St, Inc, 5, Priority::Urgent),
            (Severity::Critical, St, St, 7, Priority::High),
            (Severity::Warning, Inc, Inc, 7, Priority::High),
            (Severity::Warning, Inc, St, 14, Priority::Medium),
            (Severity::Warning, St, Inc, 14, Priority::Medium),
            (Severity::Warning, St, St, 21, Priority::Medium),
            (Severity::Normal, Inc, Inc, 30, Priority::Low),
        ];
        for (severity, vib, temp, days, priority) in cases {
            let p = plan(severity, vib, temp);
            assert_eq!((p.days, p.priority), (days, priority), "{severity} {vib} {temp}");
        }
    }

    #[test]
    fn decreasing_counts_as_not_increasing() {
        assert_eq!(
            plan(Severity::Critical, Trend::Decreasing, Trend::Decreasing),
            plan(Severity::Critical, Trend::Stable, Trend::Stable)
        );
    }

    #[test]
    fn days_are_positive_and_monotone_in_severity() {
        for vib in TRENDS {
            for temp in TRENDS {
                let normal = plan(Severity::Normal, vib, temp);
                let warning = plan(Severity::Warning, vib, temp);
                let critical = plan(Severity::Critical, vib, temp);
                assert!(critical.days >= 1);
                assert!(critical.days <= warning.days);
                assert!(warning.days <= normal.days);
                assert!(critical.priority >= warning.priority);
                assert!(warning.priority >= normal.priority);
            }
        }
    }

    #[test]
    fn every_row_has_two_or_three_checklist_items() {
        for severity in [Severity::Normal, Severity::Warning, Severity::Critical] {
            for vib in TRENDS {
                for temp in TRENDS {
                    let len = plan(severity, vib, temp).checklist.len();
                    assert!((2..=3).contains(&len), "{severity} {vib} {temp}: {len} items");
                }
            }
        }
    }

    #[test]
    fn critical_rising_everything_is_two_days_out() {
        let schedule = MaintenanceScheduler::new().schedule_on(
            Severity::Critical,
            3.0,
            Trend::Increasing,
            Trend::Increasing,
            today(),
        );
        assert_eq!(schedule.estimated_date, "2024-01-03");
        assert_eq!(schedule.days_until_maintenance, 2);
        assert_eq!(schedule.priority, Priority::Urgent);
    }

    #[test]
    fn normal_is_thirty_days_out() {
        let schedule = MaintenanceScheduler::new().schedule_on(
            Severity::Normal,
            0.0,
            Trend::Stable,
            Trend::Stable,
            today(),
        );
        assert_eq!(schedule.estimated_date, "2024-01-31");
        assert_eq!(schedule.priority, Priority::Low);
        assert!(schedule.machine_id.is_empty());
    }
}
