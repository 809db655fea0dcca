//! Alert messages and alert records built from threshold violations

use crate::types::{AlertRecord, Machine, ThresholdViolation};

impl ThresholdViolation {
    /// e.g. `CRITICAL: Temperature at 97.00 °C (threshold: 80.00 °C)`
    pub fn message(&self) -> String {
        let unit = self.metric.unit();
        format!(
            "{}: {} at {:.2} {unit} (threshold: {:.2} {unit})",
            self.severity.to_string().to_uppercase(),
            self.metric.label(),
            self.value,
            self.threshold,
        )
    }
}

impl AlertRecord {
    /// Unacknowledged alert for `violation` on `machine`.
    pub fn from_violation(machine: &Machine, violation: &ThresholdViolation, timestamp: i64) -> Self {
        Self {
            machine_id: machine.id.clone(),
            machine_name: machine.name.clone(),
            metric: violation.metric,
            severity: violation.severity,
            message: violation.message(),
            timestamp,
            acknowledged: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{AlertRecord, Machine, MetricKind, ThresholdViolation, ViolationSeverity};

    fn violation() -> ThresholdViolation {
        ThresholdViolation {
            metric: MetricKind::Vibration,
            value: 2.943,
            threshold: 2.0,
            severity: ViolationSeverity::Warning,
        }
    }

    #[test]
    fn message_carries_units() {
        assert_eq!(
            violation().message(),
            "WARNING: Vibration at 2.94 m/s² (threshold: 2.00 m/s²)"
        );
    }

    #[test]
    fn record_from_violation() {
        let machine = Machine::new("lathe-7", "CNC Lathe 7");
        let record = AlertRecord::from_violation(&machine, &violation(), 1_700_000_000_000);
        assert_eq!(record.machine_id, "lathe-7");
        assert_eq!(record.machine_name, "CNC Lathe 7");
        assert_eq!(record.metric, MetricKind::Vibration);
        assert!(!record.acknowledged);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "vibration");
        assert_eq!(json["machineId"], "lathe-7");
        assert_eq!(json["severity"], "warning");
    }
}
