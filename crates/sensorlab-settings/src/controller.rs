//! Settings Controller
//!
//! Handles interaction between the settings dialog and the store. Opening,
//! saving, and cancelling the dialog go through here; a successful save is
//! published on the event bus and handed to every saved-listener.

use crate::error::{SettingsError, SettingsResult, ValidationError};
use crate::persistence::SettingsPersistence;
use crate::schema::{SettingKey, SettingValue, Snapshot};
use crate::store::SettingsStore;
use crate::view_model::{Control, SettingsCategory, SettingsDialog};
use sensorlab_core::{
    shared_vec, AppEvent, ErrorEvent, EventBus, ListenerList, SettingsEvent, Shared, UiEvent,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name published with dialog open/close events
pub const SETTINGS_DIALOG: &str = "settings";

/// UI-friendly representation of a setting
#[derive(Debug, Clone, PartialEq)]
pub struct SettingUiModel {
    pub id: String,
    pub name: String,
    pub value: String,
    pub value_type: String,
    pub category: String,
    pub description: String,
    pub options: Vec<String>,
    pub current_index: i32,
}

/// Controller for settings logic
pub struct SettingsController {
    persistence: SettingsPersistence,
    bus: Arc<EventBus>,
    listeners: ListenerList<Snapshot>,
}

impl SettingsController {
    pub fn new(store: Shared<SettingsStore>, bus: Arc<EventBus>) -> Self {
        Self {
            persistence: SettingsPersistence::new(store),
            bus,
            listeners: shared_vec(),
        }
    }

    /// Register a callback run with the new snapshot after every save
    pub fn on_settings_saved<F>(&self, callback: F)
    where
        F: Fn(&Snapshot) + 'static,
    {
        self.listeners.borrow_mut().push(Box::new(callback));
    }

    fn publish(&self, event: AppEvent) {
        // No subscribers is not an error here
        let _ = self.bus.publish(event);
    }

    fn notify(&self, snapshot: &Snapshot) {
        let listeners = self.listeners.borrow();
        for listener in listeners.iter() {
            listener(snapshot);
        }
    }

    /// Current effective values
    pub fn snapshot(&self) -> Snapshot {
        self.persistence.snapshot()
    }

    /// Open the dialog populated from the store
    pub fn open(&self) -> SettingsDialog {
        let dialog = self.persistence.populate_dialog();
        self.publish(AppEvent::Ui(UiEvent::DialogOpened {
            dialog: SETTINGS_DIALOG.to_string(),
        }));
        debug!("Settings dialog opened");
        dialog
    }

    /// Get settings formatted for UI display, optionally filtered by tab
    pub fn get_settings_for_ui(
        dialog: &SettingsDialog,
        tab_filter: Option<SettingsCategory>,
    ) -> Vec<SettingUiModel> {
        let tabs = match tab_filter {
            Some(tab) => vec![tab],
            None => SettingsCategory::ALL.to_vec(),
        };

        tabs.into_iter()
            .flat_map(|tab| dialog.settings_for_tab(tab))
            .map(|setting| {
                let (value_type, current_index) = match &setting.control {
                    Control::ComboBox { current, .. } => ("Enum", *current as i32),
                    Control::CheckBox(_) => ("Boolean", 0),
                    Control::SpinBox { .. } => ("Integer", 0),
                    Control::DoubleSpinBox { .. } => ("Float", 0),
                    Control::LineEdit(_) => ("Path", 0),
                };

                SettingUiModel {
                    id: setting.key.path(),
                    name: setting.label.to_string(),
                    value: setting.value().encode(),
                    value_type: value_type.to_string(),
                    category: setting.tab.to_string(),
                    description: setting.description.unwrap_or_default().to_string(),
                    options: setting.control.options().to_vec(),
                    current_index,
                }
            })
            .collect()
    }

    /// Update a control from string input, addressed by `category/key`
    pub fn update_setting(
        dialog: &mut SettingsDialog,
        id: &str,
        value: &str,
    ) -> SettingsResult<()> {
        let key = SettingKey::from_path(id).ok_or_else(|| SettingsError::UnknownKey(id.to_string()))?;
        let mismatch = |expected: &'static str| ValidationError::TypeMismatch {
            key: key.path(),
            expected,
            found: format!("'{}'", value),
        };

        let value = match dialog.setting(key).map(|s| &s.control) {
            Some(Control::SpinBox { .. }) => SettingValue::Integer(
                value.trim().parse().map_err(|_| mismatch("integer"))?,
            ),
            Some(Control::DoubleSpinBox { .. }) => SettingValue::Float(
                value.trim().parse().map_err(|_| mismatch("float"))?,
            ),
            Some(Control::CheckBox(_)) => match value.trim() {
                "true" => SettingValue::Boolean(true),
                "false" => SettingValue::Boolean(false),
                _ => return Err(mismatch("boolean").into()),
            },
            Some(Control::LineEdit(_)) => SettingValue::Path(value.into()),
            Some(Control::ComboBox { .. }) | None => SettingValue::Choice(value.to_string()),
        };
        dialog.set_value(key, &value)?;
        Ok(())
    }

    /// Apply every dialog field to the store, then signal the save.
    ///
    /// On a validation failure the dialog is left as is, nothing is written,
    /// and the error is returned for display.
    pub fn save(&self, dialog: &mut SettingsDialog) -> SettingsResult<Snapshot> {
        let before = self.persistence.snapshot();

        let saved = match self.persistence.apply_dialog(dialog) {
            Ok(saved) => saved,
            Err(SettingsError::Validation(e)) => {
                warn!("Settings rejected: {}", e);
                self.publish(AppEvent::Settings(SettingsEvent::Rejected {
                    key: e.key().to_string(),
                    reason: e.to_string(),
                }));
                return Err(e.into());
            }
            Err(e) => {
                warn!("Settings save failed: {}", e);
                self.publish(AppEvent::Error(ErrorEvent::Error {
                    code: "settings.save".to_string(),
                    message: e.to_string(),
                }));
                return Err(e);
            }
        };

        let changed: Vec<String> = before.diff(&saved).iter().map(SettingKey::path).collect();
        info!("Settings saved ({} changed)", changed.len());
        dialog.mark_saved(saved.clone());

        self.publish(AppEvent::Settings(SettingsEvent::Saved { changed }));
        self.publish(AppEvent::Ui(UiEvent::DialogClosed {
            dialog: SETTINGS_DIALOG.to_string(),
        }));
        self.notify(&saved);
        Ok(saved)
    }

    /// Close the dialog without writing anything
    pub fn cancel(&self, dialog: SettingsDialog) {
        if dialog.has_unsaved_changes() {
            debug!("Discarding {} unsaved edits", dialog.changed_keys().len());
        }
        drop(dialog);
        self.publish(AppEvent::Settings(SettingsEvent::Cancelled));
        self.publish(AppEvent::Ui(UiEvent::DialogClosed {
            dialog: SETTINGS_DIALOG.to_string(),
        }));
    }

    /// Reset the dialog's controls to defaults; stored on the next save
    pub fn restore_defaults(&self, dialog: &mut SettingsDialog) {
        dialog.restore_defaults();
    }

    /// Persist a single value outside the dialog
    pub fn update_stored(&self, key: SettingKey, value: SettingValue) -> SettingsResult<()> {
        let store = self.persistence.store();
        store.borrow_mut().set(key, value)?;
        let stored = store.borrow().get(key);
        self.publish(AppEvent::Settings(SettingsEvent::Changed {
            key: key.path(),
            value: stored.encode(),
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use sensorlab_core::{shared, EventBusConfig, EventCategory, EventFilter};
    use std::cell::Cell;
    use std::rc::Rc;

    fn controller(backend: &MemoryBackend) -> (SettingsController, Arc<EventBus>) {
        let bus = Arc::new(EventBus::with_config(EventBusConfig {
            enable_history: true,
            ..Default::default()
        }));
        let store = shared(SettingsStore::new(Box::new(backend.clone())));
        (SettingsController::new(store, bus.clone()), bus)
    }

    #[test]
    fn test_save_applies_and_notifies() {
        let backend = MemoryBackend::new();
        let (controller, bus) = controller(&backend);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        controller.on_settings_saved(move |snapshot| {
            assert_eq!(snapshot.integer(SettingKey::Rate), 25);
            seen.set(seen.get() + 1);
        });

        let mut dialog = controller.open();
        dialog
            .set_value(SettingKey::Rate, &SettingValue::Integer(25))
            .unwrap();
        let saved = controller.save(&mut dialog).unwrap();

        assert_eq!(saved.integer(SettingKey::Rate), 25);
        assert_eq!(calls.get(), 1);
        assert!(!dialog.has_unsaved_changes());

        let saved_events: Vec<_> = bus
            .history()
            .into_iter()
            .filter_map(|e| match e {
                AppEvent::Settings(SettingsEvent::Saved { changed }) => Some(changed),
                _ => None,
            })
            .collect();
        assert_eq!(saved_events, vec![vec!["acq/rate".to_string()]]);
    }

    #[test]
    fn test_rejected_save_keeps_store_and_skips_listeners() {
        let backend = MemoryBackend::new();
        let (controller, bus) = controller(&backend);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        controller.on_settings_saved(move |_| seen.set(seen.get() + 1));

        let mut dialog = controller.open();
        dialog
            .set_value(SettingKey::Theme, &SettingValue::from("Light"))
            .unwrap();
        dialog
            .set_value(SettingKey::LogPath, &SettingValue::Path(Default::default()))
            .unwrap();

        let err = controller.save(&mut dialog).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Validation(ValidationError::InvalidPath { .. })
        ));
        assert_eq!(calls.get(), 0);
        assert_eq!(backend.writes(), 0);
        assert!(dialog.has_unsaved_changes());
        assert!(bus.history().iter().any(|e| matches!(
            e,
            AppEvent::Settings(SettingsEvent::Rejected { key, .. }) if key == "log/path"
        )));
    }

    #[test]
    fn test_cancel_never_writes() {
        let backend = MemoryBackend::new();
        let (controller, bus) = controller(&backend);
        let before = controller.snapshot();

        let mut dialog = controller.open();
        dialog
            .set_value(SettingKey::Channels, &SettingValue::from("8"))
            .unwrap();
        controller.restore_defaults(&mut dialog);
        dialog
            .set_value(SettingKey::Buffer, &SettingValue::Integer(900))
            .unwrap();
        controller.cancel(dialog);

        assert_eq!(controller.snapshot(), before);
        assert_eq!(backend.writes(), 0);
        assert!(bus
            .history()
            .iter()
            .any(|e| matches!(e, AppEvent::Settings(SettingsEvent::Cancelled))));
    }

    #[test]
    fn test_ui_models_for_tab() {
        let backend = MemoryBackend::new();
        let (controller, _bus) = controller(&backend);
        let dialog = controller.open();

        let device = SettingsController::get_settings_for_ui(&dialog, Some(SettingsCategory::Device));
        let ids: Vec<_> = device.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["device/baud", "device/frame", "device/channels"]);
        assert_eq!(device[0].value_type, "Enum");
        assert_eq!(device[0].current_index, 4);

        let all = SettingsController::get_settings_for_ui(&dialog, None);
        assert_eq!(all.len(), SettingKey::ALL.len());
    }

    #[test]
    fn test_update_setting_from_text() {
        let backend = MemoryBackend::new();
        let (controller, _bus) = controller(&backend);
        let mut dialog = controller.open();

        SettingsController::update_setting(&mut dialog, "acq/rate", "0").unwrap();
        assert_eq!(dialog.value(SettingKey::Rate), SettingValue::Integer(1));

        SettingsController::update_setting(&mut dialog, "ui/splash", "false").unwrap();
        assert_eq!(dialog.value(SettingKey::Splash), SettingValue::Boolean(false));

        let err = SettingsController::update_setting(&mut dialog, "ui/splash", "yes").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Validation(ValidationError::TypeMismatch { .. })
        ));
        assert_eq!(dialog.value(SettingKey::Splash), SettingValue::Boolean(false));

        assert!(SettingsController::update_setting(&mut dialog, "acq/rate", "fast").is_err());
        assert!(SettingsController::update_setting(&mut dialog, "ui/font", "12").is_err());
    }

    #[test]
    fn test_update_stored_publishes_change() {
        let backend = MemoryBackend::new();
        let (controller, bus) = controller(&backend);
        let changes = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = changes.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Settings]),
            move |e| sink.lock().unwrap().push(e.description()),
        );

        controller
            .update_stored(SettingKey::Theme, SettingValue::from("Light"))
            .unwrap();
        assert_eq!(controller.snapshot().choice(SettingKey::Theme), "Light");
        assert_eq!(
            changes.lock().unwrap().as_slice(),
            ["Setting: ui/theme = Light".to_string()]
        );
    }
}
