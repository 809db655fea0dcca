//! PlantWatch Configuration Module
//!
//! Provides deployment configuration loaded from TOML files, replacing the
//! hardcoded sensor scales, detection weights and polling intervals with
//! operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `PLANTWATCH_CONFIG` environment variable (path to TOML file)
//! 2. `plantwatch.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(PlantWatchConfig::load());
//!
//! // Anywhere in the codebase:
//! let alpha = config::get().window.ema_alpha;
//! ```

mod monitor_config;
pub mod defaults;
pub mod validation;

pub use monitor_config::*;

use std::sync::OnceLock;

/// Global configuration, initialized once at startup.
static PLANTWATCH_CONFIG: OnceLock<PlantWatchConfig> = OnceLock::new();

/// Initialize the global configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: PlantWatchConfig) {
    if PLANTWATCH_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once — ignoring");
    }
}

/// Get a reference to the global configuration.
///
/// Falls back to the built-in defaults when `init()` has not been called,
/// so library users and tests can run without a config file.
pub fn get() -> &'static PlantWatchConfig {
    PLANTWATCH_CONFIG.get_or_init(PlantWatchConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    PLANTWATCH_CONFIG.get().is_some()
}
