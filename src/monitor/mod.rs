//! Fleet monitoring: history sources, alert sinks and the periodic
//! threshold / analysis scheduler

pub mod fleet;
pub mod sink;
pub mod source;

pub use fleet::{FleetMonitor, MonitorStats};
pub use sink::{AlertSink, ChannelAlertSink, LogAlertSink};
pub use source::{FleetFileSource, HistorySource, InMemorySource, SourceError};
