//! Signal processing: raw IMU conversion, rolling vibration statistics,
//! smoothing and sample ingestion

mod conversion;
mod ingest;
mod signal;
mod window;

pub use conversion::{total_magnitude, triaxial_rms, GyroBias, UnitConverter};
pub use ingest::{IngestedSample, SampleIngestor};
pub use signal::detect_peaks;
pub use window::{Channel, Ema, RollingWindow, StreamRegistry, StreamState, WindowStats};
