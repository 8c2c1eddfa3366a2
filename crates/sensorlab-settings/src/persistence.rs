//! Settings Persistence
//!
//! Bridges the settings dialog with the settings store: populates a dialog
//! from the effective values and writes a dialog back in one step.

use crate::error::{SettingsResult, ValidationError};
use crate::schema::{SettingKey, SettingValue, Snapshot};
use crate::store::SettingsStore;
use crate::view_model::SettingsDialog;
use sensorlab_core::Shared;
use tracing::debug;

/// Settings persistence layer
#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    store: Shared<SettingsStore>,
}

impl SettingsPersistence {
    pub fn new(store: Shared<SettingsStore>) -> Self {
        Self { store }
    }

    /// Handle to the underlying store
    pub fn store(&self) -> Shared<SettingsStore> {
        self.store.clone()
    }

    /// Every effective value
    pub fn snapshot(&self) -> Snapshot {
        self.store.borrow().all()
    }

    /// Build a dialog showing the current effective values
    pub fn populate_dialog(&self) -> SettingsDialog {
        SettingsDialog::from_snapshot(&self.snapshot())
    }

    /// Check every control value against the schema without writing.
    ///
    /// Returns the canonical values, or the first failure in schema order.
    pub fn validate_dialog(
        dialog: &SettingsDialog,
    ) -> Result<Vec<(SettingKey, SettingValue)>, ValidationError> {
        dialog
            .values()
            .into_iter()
            .map(|(key, value)| key.validate(&value).map(|canonical| (key, canonical)))
            .collect()
    }

    /// Write every control value to the store.
    ///
    /// All values are validated before anything is written; on failure the
    /// store is left untouched.
    pub fn apply_dialog(&self, dialog: &SettingsDialog) -> SettingsResult<Snapshot> {
        let values = Self::validate_dialog(dialog)?;
        self.store.borrow_mut().set_many(&values)?;
        debug!("Applied {} settings from dialog", values.len());
        Ok(self.snapshot())
    }
}
