//! # SensorLab
//!
//! Shell for a multi-channel sensor instrument: a start page, a live
//! dashboard fed with simulated data, and a tabbed settings dialog backed by
//! a persistent settings file.
//!
//! ## Architecture
//!
//! SensorLab is organized as a workspace with multiple crates:
//!
//! 1. **sensorlab-core** - Errors, the application event bus, shared-state aliases
//! 2. **sensorlab-settings** - Settings schema, persistent store, dialog model and controller
//! 3. **sensorlab-display** - Live display, simulated waveform, tick loop, demo export
//! 4. **sensorlab** - The shell that wires them together, and the binary
//!
//! Data flows one way: dialog -> store -> display, and the display is only
//! refreshed after a successful save.

pub mod shell;

pub use sensorlab_core::{AppEvent, Error, EventBus, EventFilter, Page, Result};
pub use sensorlab_display::{run_display, LiveDisplay, RunDuration, RunMetadata};
pub use sensorlab_settings::{
    HeaterProfile, SensorConfig, SettingKey, SettingValue, SettingsError, SettingsManager, SettingsStore,
    Snapshot, Theme,
};
pub use shell::{IntentOutcome, ShellApp, ShellError, StatusBar, UserIntent, SPLASH_DURATION};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
