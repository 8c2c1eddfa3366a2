//! Typed configuration for SensorLab
//!
//! The store keeps every setting as a string. This module defines the typed
//! view of those values: one enum per choice setting and one struct per
//! category, assembled into [`SensorConfig`].
//!
//! Each choice enum carries the labels shown in the settings dialog. Labels
//! are also the stored form; parsing additionally accepts compact spellings
//! such as `EpochMs` or `ASCII(CSV)`.

use crate::schema::{SettingKey, Snapshot};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Error returned when a label does not name a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl std::fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown label: {}", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

/// Color theme of the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark theme
    Dark,
    /// Light theme
    Light,
}

impl Theme {
    pub const LABELS: &'static [&'static str] = &["Dark", "Light"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// The other theme, used by the View menu toggle
    pub fn toggled(&self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::Dark
    }
}

impl FromStr for Theme {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dark" => Ok(Self::Dark),
            "Light" => Ok(Self::Light),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Serial baud rate of the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaudRate {
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
}

impl BaudRate {
    pub const LABELS: &'static [&'static str] = &["9600", "19200", "38400", "57600", "115200"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::B9600 => "9600",
            Self::B19200 => "19200",
            Self::B38400 => "38400",
            Self::B57600 => "57600",
            Self::B115200 => "115200",
        }
    }

    /// Bits per second
    pub fn as_u32(&self) -> u32 {
        match self {
            Self::B9600 => 9600,
            Self::B19200 => 19200,
            Self::B38400 => 38400,
            Self::B57600 => 57600,
            Self::B115200 => 115200,
        }
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        Self::B115200
    }
}

impl FromStr for BaudRate {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "9600" => Ok(Self::B9600),
            "19200" => Ok(Self::B19200),
            "38400" => Ok(Self::B38400),
            "57600" => Ok(Self::B57600),
            "115200" => Ok(Self::B115200),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

impl std::fmt::Display for BaudRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Frame encoding announced by the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameType {
    /// Comma separated text lines
    AsciiCsv,
    /// Binary frames (label only, no decoder exists)
    Binary,
}

impl FrameType {
    pub const LABELS: &'static [&'static str] = &["ASCII (CSV)", "Binary"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AsciiCsv => "ASCII (CSV)",
            Self::Binary => "Binary",
        }
    }
}

impl Default for FrameType {
    fn default() -> Self {
        Self::AsciiCsv
    }
}

impl FromStr for FrameType {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASCII (CSV)" | "ASCII(CSV)" => Ok(Self::AsciiCsv),
            "Binary" => Ok(Self::Binary),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

impl std::fmt::Display for FrameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of sensor channels on the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelCount {
    Four,
    Eight,
}

impl ChannelCount {
    pub const LABELS: &'static [&'static str] = &["4", "8"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Four => "4",
            Self::Eight => "8",
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }
}

impl Default for ChannelCount {
    fn default() -> Self {
        Self::Four
    }
}

impl FromStr for ChannelCount {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4" => Ok(Self::Four),
            "8" => Ok(Self::Eight),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

impl std::fmt::Display for ChannelCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Timestamp representation for recorded samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Milliseconds since the Unix epoch
    EpochMs,
    /// ISO 8601 / RFC 3339 date-time
    Iso8601,
}

impl TimestampFormat {
    pub const LABELS: &'static [&'static str] = &["Epoch ms", "ISO 8601"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::EpochMs => "Epoch ms",
            Self::Iso8601 => "ISO 8601",
        }
    }
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self::EpochMs
    }
}

impl FromStr for TimestampFormat {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Epoch ms" | "EpochMs" => Ok(Self::EpochMs),
            "ISO 8601" | "ISO8601" => Ok(Self::Iso8601),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

impl std::fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Microheater drive profile
///
/// `Samio` is offered as a choice but never the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaterProfile {
    Samio,
    Linear,
    Custom,
}

impl HeaterProfile {
    pub const LABELS: &'static [&'static str] = &["Samio", "Linear", "Custom"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Samio => "Samio",
            Self::Linear => "Linear",
            Self::Custom => "Custom",
        }
    }
}

impl Default for HeaterProfile {
    fn default() -> Self {
        Self::Linear
    }
}

impl FromStr for HeaterProfile {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Samio" => Ok(Self::Samio),
            "Linear" => Ok(Self::Linear),
            "Custom" => Ok(Self::Custom),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

impl std::fmt::Display for HeaterProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// File format for recorded data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Csv,
    /// Selectable, but exports still produce CSV
    Hdf5,
}

impl LogFormat {
    pub const LABELS: &'static [&'static str] = &["CSV", "HDF5"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Hdf5 => "HDF5",
        }
    }
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Csv
    }
}

impl FromStr for LogFormat {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CSV" => Ok(Self::Csv),
            "HDF5" => Ok(Self::Hdf5),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Default directory for saved data
pub fn default_log_directory() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// General (ui) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    pub theme: Theme,
    /// Show the splash screen on startup
    pub splash: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            splash: true,
        }
    }
}

/// Device settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub baud: BaudRate,
    pub frame: FrameType,
    pub channels: ChannelCount,
}

/// Acquisition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionSettings {
    /// Default sampling rate in Hz
    pub rate_hz: u32,
    /// Plot buffer size in points per channel
    pub buffer_points: u32,
    pub timestamp_format: TimestampFormat,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            rate_hz: 10,
            buffer_points: 300,
            timestamp_format: TimestampFormat::default(),
        }
    }
}

/// Microheater settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaterSettings {
    pub profile: HeaterProfile,
    /// Maximum heater voltage in volts
    pub max_voltage: f64,
    /// Preheat duration in seconds
    pub preheat_secs: u32,
}

impl Default for HeaterSettings {
    fn default() -> Self {
        Self {
            profile: HeaterProfile::default(),
            max_voltage: 5.0,
            preheat_secs: 30,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub format: LogFormat,
    /// Default save directory
    pub path: PathBuf,
    /// Start logging automatically on connect
    pub auto_log: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            path: default_log_directory(),
            auto_log: false,
        }
    }
}

/// Advanced settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedSettings {
    /// Enable CRC for binary frames (label only)
    pub crc: bool,
    /// Serial timeout in milliseconds
    pub timeout_ms: u32,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            crc: false,
            timeout_ms: 1000,
        }
    }
}

/// Complete typed configuration
///
/// Built from a [`Snapshot`], so every field holds a validated effective value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorConfig {
    pub ui: UiSettings,
    pub device: DeviceSettings,
    pub acq: AcquisitionSettings,
    pub heater: HeaterSettings,
    pub log: LoggingSettings,
    pub adv: AdvancedSettings,
}

impl SensorConfig {
    /// Assemble the typed configuration from effective values.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            ui: UiSettings {
                theme: snapshot.parse_choice(SettingKey::Theme),
                splash: snapshot.boolean(SettingKey::Splash),
            },
            device: DeviceSettings {
                baud: snapshot.parse_choice(SettingKey::Baud),
                frame: snapshot.parse_choice(SettingKey::Frame),
                channels: snapshot.parse_choice(SettingKey::Channels),
            },
            acq: AcquisitionSettings {
                rate_hz: snapshot.unsigned(SettingKey::Rate),
                buffer_points: snapshot.unsigned(SettingKey::Buffer),
                timestamp_format: snapshot.parse_choice(SettingKey::TimestampFormat),
            },
            heater: HeaterSettings {
                profile: snapshot.parse_choice(SettingKey::HeaterProfile),
                max_voltage: snapshot.float(SettingKey::HeaterMax),
                preheat_secs: snapshot.unsigned(SettingKey::Preheat),
            },
            log: LoggingSettings {
                format: snapshot.parse_choice(SettingKey::LogFormat),
                path: snapshot.path(SettingKey::LogPath),
                auto_log: snapshot.boolean(SettingKey::AutoLog),
            },
            adv: AdvancedSettings {
                crc: snapshot.boolean(SettingKey::Crc),
                timeout_ms: snapshot.unsigned(SettingKey::Timeout),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for label in HeaterProfile::LABELS {
            let profile: HeaterProfile = label.parse().expect("label parses");
            assert_eq!(profile.label(), *label);
        }
        for label in BaudRate::LABELS {
            let baud: BaudRate = label.parse().expect("label parses");
            assert_eq!(baud.to_string(), *label);
        }
    }

    #[test]
    fn test_compact_spellings_are_accepted() {
        assert_eq!("EpochMs".parse(), Ok(TimestampFormat::EpochMs));
        assert_eq!("ISO8601".parse(), Ok(TimestampFormat::Iso8601));
        assert_eq!("ASCII(CSV)".parse(), Ok(FrameType::AsciiCsv));
    }

    #[test]
    fn test_unknown_labels_are_rejected() {
        assert!("1200".parse::<BaudRate>().is_err());
        assert!("dark".parse::<Theme>().is_err());
        assert!("16".parse::<ChannelCount>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = SensorConfig::default();
        assert_eq!(config.ui.theme, Theme::Dark);
        assert!(config.ui.splash);
        assert_eq!(config.device.baud.as_u32(), 115200);
        assert_eq!(config.device.channels.count(), 4);
        assert_eq!(config.acq.rate_hz, 10);
        assert_eq!(config.heater.profile, HeaterProfile::Linear);
        assert_eq!(config.log.format, LogFormat::Csv);
        assert_eq!(config.adv.timeout_ms, 1000);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled().toggled(), Theme::Light);
    }
}
