//! Settings dialog model
//!
//! Form state for the tabbed settings dialog. Each schema key is bound to
//! one typed control. Controls behave like their widget counterparts: a
//! combo box only accepts one of its options, spin boxes clamp to their
//! range. Nothing here touches the store.

use crate::error::ValidationError;
use crate::schema::{Category, SettingKey, SettingKind, SettingValue, Snapshot};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Dialog tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingsCategory {
    General,
    Device,
    Acquisition,
    Heater,
    Logging,
    Advanced,
}

impl SettingsCategory {
    pub const ALL: [SettingsCategory; 6] = [
        SettingsCategory::General,
        SettingsCategory::Device,
        SettingsCategory::Acquisition,
        SettingsCategory::Heater,
        SettingsCategory::Logging,
        SettingsCategory::Advanced,
    ];

    /// Tab holding the keys of a store category
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Ui => Self::General,
            Category::Device => Self::Device,
            Category::Acq => Self::Acquisition,
            Category::Heater => Self::Heater,
            Category::Log => Self::Logging,
            Category::Adv => Self::Advanced,
        }
    }
}

impl std::fmt::Display for SettingsCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => write!(f, "General"),
            Self::Device => write!(f, "Device"),
            Self::Acquisition => write!(f, "Acquisition"),
            Self::Heater => write!(f, "Heater"),
            Self::Logging => write!(f, "Logging"),
            Self::Advanced => write!(f, "Advanced"),
        }
    }
}

/// Editable control bound to one setting
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    ComboBox { options: Vec<String>, current: usize },
    CheckBox(bool),
    SpinBox { value: i64, min: i64, max: i64 },
    DoubleSpinBox { value: f64, min: f64, max: f64 },
    LineEdit(String),
}

impl Control {
    /// Control suited to `key`, showing `value`
    pub fn for_key(key: SettingKey, value: &SettingValue) -> Self {
        match key.kind() {
            SettingKind::Boolean => Control::CheckBox(value.as_bool().unwrap_or_default()),
            SettingKind::Integer { min, max } => Control::SpinBox {
                value: value.as_i64().unwrap_or(min).clamp(min, max),
                min,
                max,
            },
            SettingKind::Float { min, max } => Control::DoubleSpinBox {
                value: value.as_f64().unwrap_or(min).clamp(min, max),
                min,
                max,
            },
            SettingKind::Choice(labels) => Control::ComboBox {
                current: value
                    .as_str()
                    .and_then(|v| labels.iter().position(|label| *label == v))
                    .unwrap_or(0),
                options: labels.iter().map(|label| label.to_string()).collect(),
            },
            SettingKind::Path => Control::LineEdit(
                value
                    .as_path()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
        }
    }

    /// Value currently shown by the control
    pub fn value(&self) -> SettingValue {
        match self {
            Control::ComboBox { options, current } => {
                SettingValue::Choice(options.get(*current).cloned().unwrap_or_default())
            }
            Control::CheckBox(checked) => SettingValue::Boolean(*checked),
            Control::SpinBox { value, .. } => SettingValue::Integer(*value),
            Control::DoubleSpinBox { value, .. } => SettingValue::Float(*value),
            Control::LineEdit(text) => SettingValue::Path(PathBuf::from(text)),
        }
    }

    /// Option labels for a combo box
    pub fn options(&self) -> &[String] {
        match self {
            Control::ComboBox { options, .. } => options,
            _ => &[],
        }
    }
}

/// One row of the settings form
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub key: SettingKey,
    pub label: &'static str,
    pub description: Option<&'static str>,
    pub tab: SettingsCategory,
    pub control: Control,
}

impl Setting {
    pub fn new(key: SettingKey, label: &'static str, value: &SettingValue) -> Self {
        Self {
            key,
            label,
            description: None,
            tab: SettingsCategory::for_category(key.category()),
            control: Control::for_key(key, value),
        }
    }

    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn value(&self) -> SettingValue {
        self.control.value()
    }
}

fn row_for(key: SettingKey, value: &SettingValue) -> Setting {
    match key {
        SettingKey::Theme => Setting::new(key, "Theme", value),
        SettingKey::Splash => Setting::new(key, "Show splash on startup", value),
        SettingKey::Baud => Setting::new(key, "Baud rate", value),
        SettingKey::Frame => Setting::new(key, "Frame type", value),
        SettingKey::Channels => Setting::new(key, "Channels", value)
            .with_description("Number of channel slots shown on the dashboard"),
        SettingKey::Rate => Setting::new(key, "Default sampling rate (Hz)", value)
            .with_description("Initial refresh rate of the live display"),
        SettingKey::Buffer => Setting::new(key, "Plot buffer size (points)", value)
            .with_description("Points kept per trace"),
        SettingKey::TimestampFormat => Setting::new(key, "Timestamp format", value),
        SettingKey::HeaterProfile => Setting::new(key, "Profile", value),
        SettingKey::HeaterMax => Setting::new(key, "Max heater voltage (V)", value),
        SettingKey::Preheat => Setting::new(key, "Preheat duration (s)", value),
        SettingKey::LogFormat => Setting::new(key, "Default save format", value)
            .with_description("HDF5 exports are written as CSV"),
        SettingKey::LogPath => Setting::new(key, "Default save directory", value),
        SettingKey::AutoLog => Setting::new(key, "Auto-log on connect", value),
        SettingKey::Crc => Setting::new(key, "Enable CRC for binary frames", value),
        SettingKey::Timeout => Setting::new(key, "Serial timeout (ms)", value),
    }
}

/// Settings dialog state
#[derive(Debug, Clone)]
pub struct SettingsDialog {
    settings: BTreeMap<SettingKey, Setting>,
    opened_with: Snapshot,
}

impl SettingsDialog {
    /// Dialog with one control per key, populated from `snapshot`
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let settings = SettingKey::ALL
            .into_iter()
            .map(|key| (key, row_for(key, &snapshot.get(key))))
            .collect();
        Self {
            settings,
            opened_with: snapshot.clone(),
        }
    }

    pub fn setting(&self, key: SettingKey) -> Option<&Setting> {
        self.settings.get(&key)
    }

    /// Rows on `tab`, in schema order
    pub fn settings_for_tab(&self, tab: SettingsCategory) -> Vec<&Setting> {
        self.settings.values().filter(|s| s.tab == tab).collect()
    }

    /// Value shown for `key`
    pub fn value(&self, key: SettingKey) -> SettingValue {
        self.settings
            .get(&key)
            .map(Setting::value)
            .unwrap_or_else(|| key.default_value())
    }

    /// Every control value, in schema order
    pub fn values(&self) -> Vec<(SettingKey, SettingValue)> {
        self.settings
            .iter()
            .map(|(key, setting)| (*key, setting.value()))
            .collect()
    }

    /// Snapshot the dialog was opened with
    pub fn initial(&self) -> &Snapshot {
        &self.opened_with
    }

    /// Edit a control as the user would.
    ///
    /// Spin boxes clamp to their range. A combo box rejects text that is
    /// not one of its options and keeps its selection.
    pub fn set_value(&mut self, key: SettingKey, value: &SettingValue) -> Result<(), ValidationError> {
        let Some(setting) = self.settings.get_mut(&key) else {
            return Ok(());
        };

        let mismatch = |expected: &'static str| ValidationError::TypeMismatch {
            key: key.path(),
            expected,
            found: format!("{} {}", value.type_name(), value),
        };

        match (&mut setting.control, value) {
            (Control::CheckBox(checked), SettingValue::Boolean(b)) => *checked = *b,
            (Control::SpinBox { value: v, min, max }, SettingValue::Integer(i)) => {
                *v = (*i).clamp(*min, *max);
            }
            (Control::DoubleSpinBox { value: v, min, max }, SettingValue::Float(f)) => {
                if f.is_nan() {
                    return Err(mismatch("float"));
                }
                *v = f.clamp(*min, *max);
            }
            (Control::DoubleSpinBox { value: v, min, max }, SettingValue::Integer(i)) => {
                *v = (*i as f64).clamp(*min, *max);
            }
            (Control::ComboBox { options, current }, SettingValue::Choice(_) | SettingValue::Integer(_)) => {
                let canonical = key.validate(value)?;
                let label = canonical.as_str().unwrap_or_default();
                if let Some(index) = options.iter().position(|o| o == label) {
                    *current = index;
                }
            }
            (Control::LineEdit(text), SettingValue::Path(p)) => {
                *text = p.to_string_lossy().into_owned();
            }
            (Control::LineEdit(text), SettingValue::Choice(s)) => *text = s.clone(),
            (Control::CheckBox(_), _) => return Err(mismatch("boolean")),
            (Control::SpinBox { .. }, _) => return Err(mismatch("integer")),
            (Control::DoubleSpinBox { .. }, _) => return Err(mismatch("float")),
            (Control::ComboBox { .. }, _) => return Err(mismatch("choice")),
            (Control::LineEdit(_), _) => return Err(mismatch("path")),
        }
        Ok(())
    }

    /// Reset every control to its default. Nothing is stored until Save.
    pub fn restore_defaults(&mut self) {
        for (key, setting) in self.settings.iter_mut() {
            setting.control = Control::for_key(*key, &key.default_value());
        }
    }

    /// Keys whose control differs from the value the dialog opened with
    pub fn changed_keys(&self) -> Vec<SettingKey> {
        self.settings
            .iter()
            .filter(|(key, setting)| setting.value() != self.opened_with.get(**key))
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.changed_keys().is_empty()
    }

    /// Treat the current control values as saved
    pub fn mark_saved(&mut self, saved: Snapshot) {
        self.opened_with = saved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_control_per_key_on_its_tab() {
        let dialog = SettingsDialog::from_snapshot(&Snapshot::defaults());
        let total: usize = SettingsCategory::ALL
            .iter()
            .map(|tab| dialog.settings_for_tab(*tab).len())
            .sum();
        assert_eq!(total, SettingKey::ALL.len());

        let general: Vec<_> = dialog
            .settings_for_tab(SettingsCategory::General)
            .iter()
            .map(|s| s.key)
            .collect();
        assert_eq!(general, vec![SettingKey::Theme, SettingKey::Splash]);
    }

    #[test]
    fn test_populated_values_match_snapshot() {
        let snapshot = Snapshot::defaults();
        let dialog = SettingsDialog::from_snapshot(&snapshot);
        for (key, value) in dialog.values() {
            assert_eq!(value, snapshot.get(key), "{}", key);
        }
        assert!(!dialog.has_unsaved_changes());
    }

    #[test]
    fn test_control_kinds() {
        let dialog = SettingsDialog::from_snapshot(&Snapshot::defaults());
        let control = |key: SettingKey| dialog.setting(key).unwrap().control.clone();

        assert!(matches!(control(SettingKey::Splash), Control::CheckBox(true)));
        assert!(matches!(
            control(SettingKey::Rate),
            Control::SpinBox { value: 10, min: 1, max: 200 }
        ));
        assert!(matches!(control(SettingKey::HeaterMax), Control::DoubleSpinBox { .. }));
        assert!(matches!(control(SettingKey::LogPath), Control::LineEdit(_)));
        assert_eq!(
            control(SettingKey::Frame).options(),
            &["ASCII (CSV)".to_string(), "Binary".to_string()]
        );
    }

    #[test]
    fn test_spin_boxes_clamp() {
        let mut dialog = SettingsDialog::from_snapshot(&Snapshot::defaults());
        dialog
            .set_value(SettingKey::Rate, &SettingValue::Integer(0))
            .unwrap();
        assert_eq!(dialog.value(SettingKey::Rate), SettingValue::Integer(1));

        dialog
            .set_value(SettingKey::Rate, &SettingValue::Integer(500))
            .unwrap();
        assert_eq!(dialog.value(SettingKey::Rate), SettingValue::Integer(200));

        dialog
            .set_value(SettingKey::HeaterMax, &SettingValue::Float(99.0))
            .unwrap();
        assert_eq!(dialog.value(SettingKey::HeaterMax), SettingValue::Float(20.0));
    }

    #[test]
    fn test_combo_keeps_selection_for_unknown_text() {
        let mut dialog = SettingsDialog::from_snapshot(&Snapshot::defaults());
        let err = dialog
            .set_value(SettingKey::Baud, &SettingValue::from("1200"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidChoice { .. }));
        assert_eq!(dialog.value(SettingKey::Baud), SettingValue::from("115200"));

        dialog
            .set_value(SettingKey::Baud, &SettingValue::Integer(9600))
            .unwrap();
        assert_eq!(dialog.value(SettingKey::Baud), SettingValue::from("9600"));

        dialog
            .set_value(SettingKey::TimestampFormat, &SettingValue::from("ISO8601"))
            .unwrap();
        assert_eq!(
            dialog.value(SettingKey::TimestampFormat),
            SettingValue::from("ISO 8601")
        );
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let mut dialog = SettingsDialog::from_snapshot(&Snapshot::defaults());
        let err = dialog
            .set_value(SettingKey::AutoLog, &SettingValue::Integer(1))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TypeMismatch { expected: "boolean", .. }
        ));
        assert_eq!(dialog.value(SettingKey::AutoLog), SettingValue::Boolean(false));
    }

    #[test]
    fn test_unsaved_changes_and_restore_defaults() {
        let mut dialog = SettingsDialog::from_snapshot(&Snapshot::defaults());
        dialog
            .set_value(SettingKey::Channels, &SettingValue::from("8"))
            .unwrap();
        dialog
            .set_value(SettingKey::Crc, &SettingValue::Boolean(true))
            .unwrap();
        assert_eq!(dialog.changed_keys(), vec![SettingKey::Channels, SettingKey::Crc]);

        dialog.restore_defaults();
        assert!(!dialog.has_unsaved_changes());
    }
}
