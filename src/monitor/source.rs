//! History source abstraction: where machines and their readings come from.
//!
//! The monitor only needs two queries, the machine list and the most recent
//! readings of one machine, so the document store behind them stays
//! swappable. A JSON snapshot file and an in-memory store ship here.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::types::{FleetSnapshot, Machine, MachineRecord, SensorReading};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown machine '{0}'")]
    UnknownMachine(String),
}

/// Read-only view of machines and their reading histories.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// All monitored machines.
    async fn machines(&self) -> Result<Vec<Machine>, SourceError>;

    /// Up to `limit` most recent readings of `machine_id`, newest first.
    async fn history(&self, machine_id: &str, limit: usize) -> Result<Vec<SensorReading>, SourceError>;

    /// Human-readable name for logging.
    fn source_name(&self) -> &str;
}

fn newest_first(record: &MachineRecord, limit: usize) -> Vec<SensorReading> {
    let mut readings = record.readings.clone();
    readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    readings.truncate(limit);
    readings
}

// ============================================================================
// Fleet snapshot file
// ============================================================================

/// JSON fleet snapshot on disk, re-read on every query so an external
/// writer can keep it current.
#[derive(Debug, Clone)]
pub struct FleetFileSource {
    path: PathBuf,
}

impl FleetFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<FleetSnapshot, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_str(&contents).map_err(|source| SourceError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl HistorySource for FleetFileSource {
    async fn machines(&self) -> Result<Vec<Machine>, SourceError> {
        let snapshot = self.load().await?;
        Ok(snapshot.machines.into_iter().map(|r| r.machine).collect())
    }

    async fn history(&self, machine_id: &str, limit: usize) -> Result<Vec<SensorReading>, SourceError> {
        let snapshot = self.load().await?;
        snapshot
            .machines
            .iter()
            .find(|r| r.machine.id == machine_id)
            .map(|r| newest_first(r, limit))
            .ok_or_else(|| SourceError::UnknownMachine(machine_id.to_string()))
    }

    fn source_name(&self) -> &str {
        "fleet-file"
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Fleet held in memory; readings can be appended while the monitor runs.
#[derive(Debug, Default)]
pub struct InMemorySource {
    fleet: RwLock<FleetSnapshot>,
}

impl InMemorySource {
    pub fn new(snapshot: FleetSnapshot) -> Self {
        Self {
            fleet: RwLock::new(snapshot),
        }
    }

    /// Add a machine, replacing any machine with the same id.
    pub async fn upsert_machine(&self, machine: Machine) {
        let mut fleet = self.fleet.write().await;
        match fleet.machines.iter_mut().find(|r| r.machine.id == machine.id) {
            Some(record) => record.machine = machine,
            None => fleet.machines.push(MachineRecord {
                machine,
                readings: Vec::new(),
            }),
        }
    }

    pub async fn push_reading(&self, machine_id: &str, reading: SensorReading) -> Result<(), SourceError> {
        let mut fleet = self.fleet.write().await;
        let record = fleet
            .machines
            .iter_mut()
            .find(|r| r.machine.id == machine_id)
            .ok_or_else(|| SourceError::UnknownMachine(machine_id.to_string()))?;
        record.readings.insert(0, reading);
        Ok(())
    }
}

#[async_trait]
impl HistorySource for InMemorySource {
    async fn machines(&self) -> Result<Vec<Machine>, SourceError> {
        let fleet = self.fleet.read().await;
        Ok(fleet.machines.iter().map(|r| r.machine.clone()).collect())
    }

    async fn history(&self, machine_id: &str, limit: usize) -> Result<Vec<SensorReading>, SourceError> {
        let fleet = self.fleet.read().await;
        fleet
            .machines
            .iter()
            .find(|r| r.machine.id == machine_id)
            .map(|r| newest_first(r, limit))
            .ok_or_else(|| SourceError::UnknownMachine(machine_id.to_string()))
    }

    fn source_name(&self) -> &str {
        "in-memory"
    }
}
