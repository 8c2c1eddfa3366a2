//! Settings schema
//!
//! Declares every setting SensorLab knows about: its category, its
//! `category/key` path, its value kind with range or choices, and its default.
//! Values cross the storage boundary as strings and are decoded and validated
//! here, so the rest of the application only sees typed [`SettingValue`]s.

use crate::config::{
    default_log_directory, BaudRate, ChannelCount, FrameType, HeaterProfile, LogFormat,
    SensorConfig, Theme, TimestampFormat,
};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Namespace grouping related settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ui,
    Device,
    Acq,
    Heater,
    Log,
    Adv,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Ui,
        Category::Device,
        Category::Acq,
        Category::Heater,
        Category::Log,
        Category::Adv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ui => "ui",
            Self::Device => "device",
            Self::Acq => "acq",
            Self::Heater => "heater",
            Self::Log => "log",
            Self::Adv => "adv",
        }
    }

    /// Keys belonging to this category, in schema order
    pub fn keys(self) -> impl Iterator<Item = SettingKey> {
        SettingKey::ALL
            .into_iter()
            .filter(move |key| key.category() == self)
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidChoice {
                key: "category".to_string(),
                value: s.to_string(),
                choices: Category::ALL.map(|c| c.as_str()).join(", "),
            })
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared kind of a setting value, with its constraints
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingKind {
    Boolean,
    /// Inclusive integer range
    Integer { min: i64, max: i64 },
    /// Inclusive float range
    Float { min: f64, max: f64 },
    /// One of a fixed set of labels
    Choice(&'static [&'static str]),
    /// Filesystem path
    Path,
}

impl SettingKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer { .. } => "integer",
            Self::Float { .. } => "float",
            Self::Choice(_) => "choice",
            Self::Path => "path",
        }
    }
}

/// A typed setting value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Choice(String),
    Path(PathBuf),
}

impl SettingValue {
    /// String form written to the backing store
    pub fn encode(&self) -> String {
        match self {
            Self::Boolean(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Choice(s) => s.clone(),
            Self::Path(p) => p.to_string_lossy().into_owned(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Choice(_) => "choice",
            Self::Path(_) => "path",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Choice(value.to_string())
    }
}

impl From<PathBuf> for SettingValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

/// Every setting in the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SettingKey {
    Theme,
    Splash,
    Baud,
    Frame,
    Channels,
    Rate,
    Buffer,
    TimestampFormat,
    HeaterProfile,
    HeaterMax,
    Preheat,
    LogFormat,
    LogPath,
    AutoLog,
    Crc,
    Timeout,
}

impl SettingKey {
    pub const ALL: [SettingKey; 16] = [
        SettingKey::Theme,
        SettingKey::Splash,
        SettingKey::Baud,
        SettingKey::Frame,
        SettingKey::Channels,
        SettingKey::Rate,
        SettingKey::Buffer,
        SettingKey::TimestampFormat,
        SettingKey::HeaterProfile,
        SettingKey::HeaterMax,
        SettingKey::Preheat,
        SettingKey::LogFormat,
        SettingKey::LogPath,
        SettingKey::AutoLog,
        SettingKey::Crc,
        SettingKey::Timeout,
    ];

    pub fn category(&self) -> Category {
        match self {
            Self::Theme | Self::Splash => Category::Ui,
            Self::Baud | Self::Frame | Self::Channels => Category::Device,
            Self::Rate | Self::Buffer | Self::TimestampFormat => Category::Acq,
            Self::HeaterProfile | Self::HeaterMax | Self::Preheat => Category::Heater,
            Self::LogFormat | Self::LogPath | Self::AutoLog => Category::Log,
            Self::Crc | Self::Timeout => Category::Adv,
        }
    }

    /// Key name within its category
    pub fn name(&self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::Splash => "splash",
            Self::Baud => "baud",
            Self::Frame => "frame",
            Self::Channels => "channels",
            Self::Rate => "rate",
            Self::Buffer => "buffer",
            Self::TimestampFormat => "ts",
            Self::HeaterProfile => "profile",
            Self::HeaterMax => "max",
            Self::Preheat => "preheat",
            Self::LogFormat => "format",
            Self::LogPath => "path",
            Self::AutoLog => "auto",
            Self::Crc => "crc",
            Self::Timeout => "timeout",
        }
    }

    /// Full `category/key` path
    pub fn path(&self) -> String {
        format!("{}/{}", self.category().as_str(), self.name())
    }

    /// Look up a key by `category/key` (or `category.key`) path.
    pub fn from_path(path: &str) -> Option<Self> {
        let (category, name) = path.split_once(['/', '.'])?;
        let category: Category = category.parse().ok()?;
        category.keys().find(|key| key.name() == name)
    }

    pub fn kind(&self) -> SettingKind {
        match self {
            Self::Theme => SettingKind::Choice(Theme::LABELS),
            Self::Splash | Self::AutoLog | Self::Crc => SettingKind::Boolean,
            Self::Baud => SettingKind::Choice(BaudRate::LABELS),
            Self::Frame => SettingKind::Choice(FrameType::LABELS),
            Self::Channels => SettingKind::Choice(ChannelCount::LABELS),
            Self::Rate => SettingKind::Integer { min: 1, max: 200 },
            Self::Buffer => SettingKind::Integer { min: 50, max: 5000 },
            Self::TimestampFormat => SettingKind::Choice(TimestampFormat::LABELS),
            Self::HeaterProfile => SettingKind::Choice(HeaterProfile::LABELS),
            Self::HeaterMax => SettingKind::Float {
                min: 0.1,
                max: 20.0,
            },
            Self::Preheat => SettingKind::Integer { min: 0, max: 600 },
            Self::LogFormat => SettingKind::Choice(LogFormat::LABELS),
            Self::LogPath => SettingKind::Path,
            Self::Timeout => SettingKind::Integer { min: 1, max: 5000 },
        }
    }

    pub fn default_value(&self) -> SettingValue {
        match self {
            Self::Theme => Theme::default().label().into(),
            Self::Splash => SettingValue::Boolean(true),
            Self::Baud => BaudRate::default().label().into(),
            Self::Frame => FrameType::default().label().into(),
            Self::Channels => ChannelCount::default().label().into(),
            Self::Rate => SettingValue::Integer(10),
            Self::Buffer => SettingValue::Integer(300),
            Self::TimestampFormat => TimestampFormat::default().label().into(),
            Self::HeaterProfile => HeaterProfile::default().label().into(),
            Self::HeaterMax => SettingValue::Float(5.0),
            Self::Preheat => SettingValue::Integer(30),
            Self::LogFormat => LogFormat::default().label().into(),
            Self::LogPath => SettingValue::Path(default_log_directory()),
            Self::AutoLog | Self::Crc => SettingValue::Boolean(false),
            Self::Timeout => SettingValue::Integer(1000),
        }
    }

    /// Canonical label for a choice, resolved through the typed enum
    fn canonical_choice(&self, raw: &str) -> Option<&'static str> {
        match self {
            Self::Theme => raw.parse::<Theme>().ok().map(|v| v.label()),
            Self::Baud => raw.parse::<BaudRate>().ok().map(|v| v.label()),
            Self::Frame => raw.parse::<FrameType>().ok().map(|v| v.label()),
            Self::Channels => raw.parse::<ChannelCount>().ok().map(|v| v.label()),
            Self::TimestampFormat => raw.parse::<TimestampFormat>().ok().map(|v| v.label()),
            Self::HeaterProfile => raw.parse::<HeaterProfile>().ok().map(|v| v.label()),
            Self::LogFormat => raw.parse::<LogFormat>().ok().map(|v| v.label()),
            _ => None,
        }
    }

    /// Check a value against the declared kind and range.
    ///
    /// Returns the canonical form of the value: choice aliases resolve to
    /// their label, integers given for a float or numeric-choice key are
    /// converted.
    pub fn validate(&self, value: &SettingValue) -> Result<SettingValue, ValidationError> {
        match (self.kind(), value) {
            (SettingKind::Boolean, SettingValue::Boolean(b)) => Ok(SettingValue::Boolean(*b)),
            (SettingKind::Integer { min, max }, SettingValue::Integer(v)) => {
                if (min..=max).contains(v) {
                    Ok(SettingValue::Integer(*v))
                } else {
                    Err(ValidationError::OutOfRange {
                        key: self.path(),
                        value: v.to_string(),
                        min: min.to_string(),
                        max: max.to_string(),
                    })
                }
            }
            (SettingKind::Float { min, max }, SettingValue::Float(v)) => {
                if (min..=max).contains(v) {
                    Ok(SettingValue::Float(*v))
                } else {
                    Err(ValidationError::OutOfRange {
                        key: self.path(),
                        value: v.to_string(),
                        min: min.to_string(),
                        max: max.to_string(),
                    })
                }
            }
            (SettingKind::Float { .. }, SettingValue::Integer(v)) => {
                self.validate(&SettingValue::Float(*v as f64))
            }
            (SettingKind::Choice(labels), SettingValue::Choice(s)) => self
                .canonical_choice(s)
                .map(SettingValue::from)
                .ok_or_else(|| ValidationError::InvalidChoice {
                    key: self.path(),
                    value: s.clone(),
                    choices: labels.join(", "),
                }),
            (SettingKind::Choice(_), SettingValue::Integer(v)) => {
                self.validate(&SettingValue::Choice(v.to_string()))
            }
            (SettingKind::Path, SettingValue::Path(p)) => {
                if p.as_os_str().is_empty() {
                    Err(ValidationError::InvalidPath {
                        key: self.path(),
                        reason: "path is empty".to_string(),
                    })
                } else {
                    Ok(SettingValue::Path(p.clone()))
                }
            }
            (kind, other) => Err(ValidationError::TypeMismatch {
                key: self.path(),
                expected: kind.type_name(),
                found: format!("{} {}", other.type_name(), other),
            }),
        }
    }

    /// Decode the stored string form and validate it.
    pub fn decode(&self, raw: &str) -> Result<SettingValue, ValidationError> {
        let mismatch = |expected: &'static str| ValidationError::TypeMismatch {
            key: self.path(),
            expected,
            found: format!("'{}'", raw),
        };

        let value = match self.kind() {
            SettingKind::Boolean => match raw.trim() {
                "true" => SettingValue::Boolean(true),
                "false" => SettingValue::Boolean(false),
                _ => return Err(mismatch("boolean")),
            },
            SettingKind::Integer { .. } => raw
                .trim()
                .parse::<i64>()
                .map(SettingValue::Integer)
                .map_err(|_| mismatch("integer"))?,
            SettingKind::Float { .. } => raw
                .trim()
                .parse::<f64>()
                .map(SettingValue::Float)
                .map_err(|_| mismatch("float"))?,
            SettingKind::Choice(_) => SettingValue::Choice(raw.to_string()),
            SettingKind::Path => SettingValue::Path(PathBuf::from(raw)),
        };

        self.validate(&value)
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.category().as_str(), self.name())
    }
}

/// Immutable point-in-time copy of every effective value
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    values: BTreeMap<SettingKey, SettingValue>,
}

impl Snapshot {
    /// Snapshot holding only defaults
    pub fn defaults() -> Self {
        Self::from_fn(|key| key.default_value())
    }

    pub(crate) fn from_fn(mut f: impl FnMut(SettingKey) -> SettingValue) -> Self {
        Self {
            values: SettingKey::ALL.into_iter().map(|key| (key, f(key))).collect(),
        }
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        self.values
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.default_value())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SettingKey, &SettingValue)> {
        self.values.iter().map(|(key, value)| (*key, value))
    }

    fn read<T: Default>(&self, key: SettingKey, f: impl Fn(&SettingValue) -> Option<T>) -> T {
        self.values
            .get(&key)
            .and_then(&f)
            .or_else(|| f(&key.default_value()))
            .unwrap_or_default()
    }

    pub fn boolean(&self, key: SettingKey) -> bool {
        self.read(key, SettingValue::as_bool)
    }

    pub fn integer(&self, key: SettingKey) -> i64 {
        self.read(key, SettingValue::as_i64)
    }

    /// Integer value for keys whose range is non-negative
    pub fn unsigned(&self, key: SettingKey) -> u32 {
        u32::try_from(self.integer(key)).unwrap_or_default()
    }

    pub fn float(&self, key: SettingKey) -> f64 {
        self.read(key, SettingValue::as_f64)
    }

    pub fn choice(&self, key: SettingKey) -> String {
        self.read(key, |v| v.as_str().map(str::to_string))
    }

    /// Parse a choice into its typed enum
    pub fn parse_choice<T: FromStr + Default>(&self, key: SettingKey) -> T {
        self.choice(key).parse().unwrap_or_default()
    }

    pub fn path(&self, key: SettingKey) -> PathBuf {
        self.read(key, |v| v.as_path().map(Path::to_path_buf))
    }

    /// Typed view of this snapshot
    pub fn config(&self) -> SensorConfig {
        SensorConfig::from_snapshot(self)
    }

    /// Keys whose value differs between `self` and `other`
    pub fn diff(&self, other: &Snapshot) -> Vec<SettingKey> {
        SettingKey::ALL
            .into_iter()
            .filter(|key| self.get(*key) != other.get(*key))
            .collect()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_unique_and_resolvable() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::from_path(&key.path()), Some(key));
        }
        assert_eq!(SettingKey::from_path("acq.rate"), Some(SettingKey::Rate));
        assert_eq!(SettingKey::from_path("acq/unknown"), None);
        assert_eq!(SettingKey::from_path("rate"), None);
    }

    #[test]
    fn test_every_category_has_keys() {
        let total: usize = Category::ALL.iter().map(|c| c.keys().count()).sum();
        assert_eq!(total, SettingKey::ALL.len());
    }

    #[test]
    fn test_defaults_validate() {
        for key in SettingKey::ALL {
            let default = key.default_value();
            assert_eq!(key.validate(&default), Ok(default.clone()), "{}", key);
        }
    }

    #[test]
    fn test_integer_range() {
        assert!(SettingKey::Rate.validate(&SettingValue::Integer(1)).is_ok());
        assert!(SettingKey::Rate.validate(&SettingValue::Integer(200)).is_ok());
        assert!(matches!(
            SettingKey::Rate.validate(&SettingValue::Integer(0)),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            SettingKey::Rate.validate(&SettingValue::Integer(500)),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_float_range_rejects_nan() {
        assert!(SettingKey::HeaterMax.validate(&SettingValue::Float(0.1)).is_ok());
        assert!(SettingKey::HeaterMax
            .validate(&SettingValue::Float(f64::NAN))
            .is_err());
        assert!(SettingKey::HeaterMax
            .validate(&SettingValue::Float(20.5))
            .is_err());
        assert_eq!(
            SettingKey::HeaterMax.validate(&SettingValue::Integer(12)),
            Ok(SettingValue::Float(12.0))
        );
    }

    #[test]
    fn test_choice_canonicalization() {
        assert_eq!(
            SettingKey::TimestampFormat.validate(&"ISO8601".into()),
            Ok(SettingValue::Choice("ISO 8601".to_string()))
        );
        assert_eq!(
            SettingKey::Baud.validate(&SettingValue::Integer(9600)),
            Ok(SettingValue::Choice("9600".to_string()))
        );
        assert!(matches!(
            SettingKey::Baud.validate(&"1200".into()),
            Err(ValidationError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let err = SettingKey::Splash
            .validate(&SettingValue::Integer(1))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TypeMismatch {
                expected: "boolean",
                ..
            }
        ));
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            SettingKey::Rate.decode(" 25 "),
            Ok(SettingValue::Integer(25))
        );
        assert_eq!(
            SettingKey::Splash.decode("false"),
            Ok(SettingValue::Boolean(false))
        );
        assert!(SettingKey::Splash.decode("yes").is_err());
        assert!(SettingKey::Rate.decode("fast").is_err());
        assert!(SettingKey::LogPath.decode("").is_err());
    }

    #[test]
    fn test_encode_decode_is_stable_for_defaults() {
        for key in SettingKey::ALL {
            let default = key.default_value();
            assert_eq!(key.decode(&default.encode()), Ok(default), "{}", key);
        }
    }

    #[test]
    fn test_snapshot_accessors_and_diff() {
        let defaults = Snapshot::defaults();
        assert_eq!(defaults.integer(SettingKey::Rate), 10);
        assert_eq!(defaults.choice(SettingKey::HeaterProfile), "Linear");
        assert!(defaults.boolean(SettingKey::Splash));
        assert_eq!(defaults.config(), SensorConfig::default());

        let changed = Snapshot::from_fn(|key| match key {
            SettingKey::Rate => SettingValue::Integer(50),
            other => other.default_value(),
        });
        assert_eq!(defaults.diff(&changed), vec![SettingKey::Rate]);
        assert_eq!(changed.config().acq.rate_hz, 50);
    }
}
