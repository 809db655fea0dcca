//! Alert sinks: where alert records go once created

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::types::{AlertRecord, ViolationSeverity};

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn publish(&self, alert: AlertRecord) -> Result<()>;

    /// Human-readable name for logging.
    fn sink_name(&self) -> &str;
}

/// Writes alerts to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn publish(&self, alert: AlertRecord) -> Result<()> {
        match alert.severity {
            ViolationSeverity::Critical => error!(
                machine = %alert.machine_id,
                metric = %alert.metric,
                "{}",
                alert.message
            ),
            ViolationSeverity::Warning => warn!(
                machine = %alert.machine_id,
                metric = %alert.metric,
                "{}",
                alert.message
            ),
        }
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "log"
    }
}

/// Forwards alerts over a tokio channel to whatever persists them.
#[derive(Debug, Clone)]
pub struct ChannelAlertSink {
    tx: mpsc::Sender<AlertRecord>,
}

impl ChannelAlertSink {
    pub fn new(tx: mpsc::Sender<AlertRecord>) -> Self {
        Self { tx }
    }

    /// Sink plus the receiving end, with room for `capacity` queued alerts.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AlertRecord>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl AlertSink for ChannelAlertSink {
    async fn publish(&self, alert: AlertRecord) -> Result<()> {
        self.tx
            .send(alert)
            .await
            .map_err(|_| anyhow::anyhow!("alert receiver dropped"))
    }

    fn sink_name(&self) -> &str {
        "channel"
    }
}
