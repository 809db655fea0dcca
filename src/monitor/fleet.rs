//! Fleet monitor: periodic threshold checks and predictive analysis passes
//!
//! Two independent cadences drive the monitor:
//!
//! - **Threshold pass** (every 30 s by default): the newest reading of each
//!   machine is checked against its configured limits. New violations become
//!   alert records, deduplicated per (machine, metric, severity) for 5 min.
//! - **Analysis pass** (every 120 s by default): histories are fetched
//!   concurrently, then every machine is analysed on the rayon pool. Machine
//!   analyses share nothing, so they run fully in parallel.

use chrono::Utc;
use futures::future::join_all;
use rayon::prelude::*;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::alerting::{fleet_efficiency, machine_efficiency, AlertDeduplicator, AlertKey, ThresholdEvaluator};
use crate::analysis::MachineAnalyzer;
use crate::config::{MonitorConfig, PlantWatchConfig};
use crate::types::{
    AlertRecord, AnalysisOutcome, FleetReport, Machine, MachineAnalysis, SensorReading, SkippedMachine,
};

use super::sink::AlertSink;
use super::source::{HistorySource, SourceError};

/// Counters returned when [`FleetMonitor::run`] stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub threshold_passes: u64,
    pub analysis_passes: u64,
    pub alerts_published: u64,
}

/// Outcome of one machine in an analysis pass.
enum MachineResult {
    Analyzed {
        analysis: Box<MachineAnalysis>,
        efficiency: u8,
    },
    Skipped {
        skipped: SkippedMachine,
        efficiency: Option<u8>,
    },
}

pub struct FleetMonitor<S: HistorySource, K: AlertSink> {
    source: S,
    sink: K,
    evaluator: ThresholdEvaluator,
    analyzer: MachineAnalyzer,
    dedup: AlertDeduplicator,
    history_limit: usize,
    schedule: MonitorConfig,
    reports: Option<mpsc::Sender<FleetReport>>,
}

impl<S: HistorySource, K: AlertSink> FleetMonitor<S, K> {
    pub fn new(source: S, sink: K, config: &PlantWatchConfig) -> Self {
        Self {
            source,
            sink,
            evaluator: ThresholdEvaluator::from_config(&config.thresholds),
            analyzer: MachineAnalyzer::from_config(config),
            dedup: AlertDeduplicator::from_config(&config.monitor),
            history_limit: config.detection.history_limit.max(1),
            schedule: config.monitor.clone(),
            reports: None,
        }
    }

    /// Forward every fleet report produced by [`run`](Self::run).
    pub fn with_report_channel(mut self, tx: mpsc::Sender<FleetReport>) -> Self {
        self.reports = Some(tx);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Check the newest reading of every machine against its limits and
    /// publish new alerts. Returns the number of alerts published.
    pub async fn run_threshold_pass(&mut self) -> Result<usize, SourceError> {
        let machines = self.source.machines().await?;
        let now = Utc::now();
        self.dedup.purge_expired(now);

        let mut published = 0;
        for machine in &machines {
            let Some(thresholds) = machine.thresholds else {
                debug!(machine = %machine.id, "No thresholds configured, skipping");
                continue;
            };

            let latest = match self.source.history(&machine.id, 1).await {
                Ok(history) => history.into_iter().next(),
                Err(e) => {
                    warn!(machine = %machine.id, error = %e, "Failed to fetch latest reading");
                    continue;
                }
            };
            let Some(latest) = latest else {
                continue;
            };

            for violation in self.evaluator.evaluate(&latest, &thresholds) {
                let key = AlertKey::new(machine.id.clone(), violation.metric, violation.severity);
                if self.dedup.is_suppressed(&key, now) {
                    continue;
                }
                let record = AlertRecord::from_violation(machine, &violation, now.timestamp_millis());
                match self.sink.publish(record).await {
                    Ok(()) => {
                        self.dedup.record(key, now);
                        published += 1;
                    }
                    Err(e) => warn!(
                        key = %key,
                        sink = self.sink.sink_name(),
                        error = %e,
                        "Failed to publish alert"
                    ),
                }
            }
        }

        debug!(machines = machines.len(), published, "Threshold pass complete");
        Ok(published)
    }

    /// Analyse every machine and summarise the fleet.
    pub async fn run_analysis_pass(&self) -> Result<FleetReport, SourceError> {
        let machines = self.source.machines().await?;
        let histories = join_all(
            machines
                .iter()
                .map(|m| self.source.history(&m.id, self.history_limit)),
        )
        .await;

        let fetched: Vec<(Machine, Result<Vec<SensorReading>, SourceError>)> =
            machines.into_iter().zip(histories).collect();

        let today = Utc::now().date_naive();
        let analyzer = &self.analyzer;
        let evaluator = &self.evaluator;
        let results: Vec<MachineResult> = fetched
            .par_iter()
            .map(|(machine, history)| match history {
                Ok(history) => {
                    let efficiency = machine_efficiency(evaluator, history, machine.thresholds.as_ref());
                    match analyzer.analyze_on(machine, history, today) {
                        AnalysisOutcome::Complete(analysis) => MachineResult::Analyzed {
                            analysis,
                            efficiency,
                        },
                        AnalysisOutcome::InsufficientData {
                            machine_id,
                            available,
                            required,
                        } => MachineResult::Skipped {
                            skipped: SkippedMachine {
                                machine_id,
                                reason: format!(
                                    "insufficient history ({available} of {required} readings)"
                                ),
                            },
                            efficiency: Some(efficiency),
                        },
                    }
                }
                Err(e) => MachineResult::Skipped {
                    skipped: SkippedMachine {
                        machine_id: machine.id.clone(),
                        reason: e.to_string(),
                    },
                    efficiency: None,
                },
            })
            .collect();

        let total_machines = results.len();
        let mut analyses = Vec::new();
        let mut skipped = Vec::new();
        let mut efficiencies = Vec::new();
        for result in results {
            match result {
                MachineResult::Analyzed {
                    analysis,
                    efficiency,
                } => {
                    analyses.push(*analysis);
                    efficiencies.push(efficiency);
                }
                MachineResult::Skipped {
                    skipped: s,
                    efficiency,
                } => {
                    skipped.push(s);
                    efficiencies.extend(efficiency);
                }
            }
        }

        let report = FleetReport {
            generated_at: Utc::now(),
            total_machines,
            analyzed_machines: analyses.len(),
            analyses,
            skipped,
            fleet_efficiency: fleet_efficiency(&efficiencies),
        };

        info!(
            machines = report.total_machines,
            analyzed = report.analyzed_machines,
            skipped = report.skipped.len(),
            efficiency = report.fleet_efficiency,
            "Analysis pass complete"
        );
        Ok(report)
    }

    /// Run both passes on their intervals until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) -> MonitorStats {
        let mut stats = MonitorStats::default();
        let mut threshold_tick = interval(Duration::from_secs(self.schedule.threshold_interval_secs.max(1)));
        let mut analysis_tick = interval(Duration::from_secs(self.schedule.analysis_interval_secs.max(1)));
        threshold_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        analysis_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            source = self.source.source_name(),
            sink = self.sink.sink_name(),
            threshold_secs = self.schedule.threshold_interval_secs,
            analysis_secs = self.schedule.analysis_interval_secs,
            "Fleet monitor started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("[FleetMonitor] Shutdown signal received");
                    break;
                }
                _ = threshold_tick.tick() => {
                    stats.threshold_passes += 1;
                    match self.run_threshold_pass().await {
                        Ok(published) => stats.alerts_published += published as u64,
                        Err(e) => warn!(error = %e, "Threshold pass failed"),
                    }
                }
                _ = analysis_tick.tick() => {
                    stats.analysis_passes += 1;
                    match self.run_analysis_pass().await {
                        Ok(report) => {
                            if let Some(tx) = &self.reports {
                                if tx.send(report).await.is_err() {
                                    debug!("Report receiver dropped");
                                    self.reports = None;
                                }
                            }
                        }
                        Err(e) => warn!(error = %e, "Analysis pass failed"),
                    }
                }
            }
        }

        info!(
            threshold_passes = stats.threshold_passes,
            analysis_passes = stats.analysis_passes,
            alerts = stats.alerts_published,
            "Fleet monitor stopped"
        );
        stats
    }
}
