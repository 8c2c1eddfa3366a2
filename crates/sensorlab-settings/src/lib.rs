//! SensorLab Settings Crate
//!
//! Settings schema and defaults, the persistent settings store with its
//! backends, and the settings dialog model with its controller.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod manager;
pub mod persistence;
pub mod schema;
pub mod store;
pub mod view_model;

pub use backend::{FileBackend, FileFormat, MemoryBackend, RawSettings, SettingsBackend};
pub use config::{
    AcquisitionSettings, AdvancedSettings, BaudRate, ChannelCount, DeviceSettings, FrameType,
    HeaterProfile, HeaterSettings, LogFormat, LoggingSettings, SensorConfig, Theme,
    TimestampFormat, UiSettings,
};
pub use controller::{SettingUiModel, SettingsController};
pub use error::{SettingsError, SettingsResult, ValidationError};
pub use manager::SettingsManager;
pub use persistence::SettingsPersistence;
pub use schema::{Category, SettingKey, SettingKind, SettingValue, Snapshot};
pub use store::SettingsStore;
pub use view_model::{Control, Setting, SettingsCategory, SettingsDialog};
