//! # SensorLab Display
//!
//! The live dashboard model: eight channel slots fed by a simulated sine
//! waveform, a tokio tick loop, and the demo data export.
//!
//! The display reads its refresh rate, channel count, heater profile and
//! buffer size from a settings [`Snapshot`](sensorlab_settings::Snapshot)
//! and never writes to the store.

pub mod display;
pub mod export;
pub mod runner;
pub mod waveform;

pub use display::{
    interval_for_rate, ChannelSlot, DisplaySettings, DisplayState, LiveDisplay, MAX_RATE_HZ,
    MIN_RATE_HZ, SLOT_COUNT,
};
pub use export::{
    default_export_path, export_demo, format_timestamp, write_demo_csv, ExportReport,
    RunDuration, RunMetadata, DEFAULT_EXPORT_FILE, DEMO_ROWS,
};
pub use runner::run_display;
pub use waveform::{demo_sample, live_sample, SineWaveform, TIME_STEP};
