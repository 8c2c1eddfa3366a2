//! Application shell
//!
//! Owns the page state and routes [`UserIntent`]s from the display surface
//! to the settings controller and the live display. Everything runs on the
//! UI thread; the store and display are shared through `Rc<RefCell<_>>`.
//!
//! Page flow: `Splash` (when enabled) -> `Start` -> `Dashboard`. The settings
//! dialog can be opened from any page and is modal: at most one is open.

use chrono::Utc;
use sensorlab_core::{
    shared, AppEvent, DisplayEvent, ErrorEvent, EventBus, ExportEvent, Page, Shared, UiEvent,
};
use sensorlab_display::{default_export_path, export_demo, ExportReport, LiveDisplay, RunMetadata};
use sensorlab_settings::{
    HeaterProfile, SettingKey, SettingValue, SettingsController, SettingsDialog, SettingsError,
    SettingsStore, Snapshot, Theme,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// How long the splash screen stays up
pub const SPLASH_DURATION: Duration = Duration::from_millis(1200);

/// Errors surfaced to the display surface
#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Core(#[from] sensorlab_core::Error),

    #[error("Settings dialog is not open")]
    NoDialog,
}

/// Typed message emitted by the display surface
#[derive(Debug, Clone, PartialEq)]
pub enum UserIntent {
    /// The splash screen finished
    SplashFinished,
    /// "Start" on the start page
    RequestStart,
    /// File > Settings, or "Settings" on the start page
    RequestOpenSettings,
    /// Edits made in the dialog, applied before saving
    Save(Vec<(SettingKey, SettingValue)>),
    Cancel,
    /// "Restore defaults" in the dialog
    RestoreDefaults,
    /// View > Toggle Light/Dark; ignored while the dialog is open
    ToggleTheme,
    /// Dashboard sampling rate spinner
    SetRate(i64),
    /// Dashboard microheater selector
    SetHeaterProfile(HeaterProfile),
    /// Dashboard metadata panel
    UpdateMetadata(RunMetadata),
    /// "Save Data"; `None` exports to the default location
    ExportDemo { path: Option<PathBuf> },
}

/// What handling an intent did
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    PageChanged(Page),
    DialogOpened,
    Saved(Snapshot),
    Cancelled,
    DefaultsRestored,
    ThemeApplied(Theme),
    RateChanged { rate_hz: i64, interval_ms: u64 },
    ProfileChanged(HeaterProfile),
    MetadataUpdated,
    Exported(ExportReport),
    /// The intent does not apply in the current state
    Ignored,
}

/// Status bar text
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBar {
    pub message: String,
    pub elapsed: String,
    pub rate: String,
    pub logging: String,
}

impl StatusBar {
    pub fn new(message: &str, elapsed: Duration, rate_hz: i64, logging: bool) -> Self {
        let secs = elapsed.as_secs();
        Self {
            message: message.to_string(),
            elapsed: format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60),
            rate: format!("{} Hz", rate_hz),
            logging: if logging { "Logging ON" } else { "Logging OFF" }.to_string(),
        }
    }
}

impl std::fmt::Display for StatusBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.message, self.elapsed, self.rate, self.logging
        )
    }
}

/// Main window state
pub struct ShellApp {
    bus: Arc<EventBus>,
    controller: SettingsController,
    display: Shared<LiveDisplay>,
    page: Page,
    theme: Theme,
    dialog: Option<SettingsDialog>,
    metadata: RunMetadata,
    started_at: Option<Instant>,
    message: String,
}

impl ShellApp {
    pub fn new(store: Shared<SettingsStore>, bus: Arc<EventBus>) -> Self {
        let controller = SettingsController::new(store, bus.clone());
        let snapshot = controller.snapshot();

        let display = shared(LiveDisplay::new(&snapshot));
        let _ = bus.publish(AppEvent::Display(DisplayEvent::Started {
            interval_ms: display.borrow().interval_ms(),
        }));

        let listener = display.clone();
        let events = bus.clone();
        controller.on_settings_saved(move |snapshot| {
            for event in listener.borrow_mut().apply_settings(snapshot) {
                let _ = events.publish(AppEvent::Display(event));
            }
        });

        let page = if snapshot.boolean(SettingKey::Splash) {
            Page::Splash
        } else {
            Page::Start
        };

        let mut shell = Self {
            bus,
            controller,
            display,
            page,
            theme: Theme::default(),
            dialog: None,
            metadata: RunMetadata::default(),
            started_at: None,
            message: "Ready".to_string(),
        };
        shell.apply_theme(snapshot.parse_choice(SettingKey::Theme));
        shell.publish(AppEvent::Ui(UiEvent::PageChanged { page }));
        info!("Shell started on {:?}", page);
        shell
    }

    fn publish(&self, event: AppEvent) {
        let _ = self.bus.publish(event);
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Handle to the live display, for the tick loop
    pub fn display(&self) -> Shared<LiveDisplay> {
        self.display.clone()
    }

    /// Open settings dialog, if any
    pub fn dialog(&self) -> Option<&SettingsDialog> {
        self.dialog.as_ref()
    }

    pub fn metadata(&self) -> &RunMetadata {
        &self.metadata
    }

    /// Current effective settings
    pub fn settings(&self) -> Snapshot {
        self.controller.snapshot()
    }

    pub fn status_bar(&self) -> StatusBar {
        let elapsed = self
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or_default();
        StatusBar::new(
            &self.message,
            elapsed,
            self.display.borrow().rate_hz(),
            self.metadata.logging,
        )
    }

    fn set_page(&mut self, page: Page) -> IntentOutcome {
        if self.page == page {
            return IntentOutcome::Ignored;
        }
        info!("Page {:?} -> {:?}", self.page, page);
        self.page = page;
        self.publish(AppEvent::Ui(UiEvent::PageChanged { page }));
        IntentOutcome::PageChanged(page)
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        debug!("Theme applied: {}", theme);
        self.publish(AppEvent::Ui(UiEvent::ThemeChanged {
            theme: theme.label().to_string(),
        }));
    }

    pub fn handle(&mut self, intent: UserIntent) -> Result<IntentOutcome, ShellError> {
        match intent {
            UserIntent::SplashFinished => {
                if self.page != Page::Splash {
                    return Ok(IntentOutcome::Ignored);
                }
                Ok(self.set_page(Page::Start))
            }
            UserIntent::RequestStart => {
                let outcome = self.set_page(Page::Dashboard);
                if outcome != IntentOutcome::Ignored {
                    self.started_at = Some(Instant::now());
                }
                Ok(outcome)
            }
            UserIntent::RequestOpenSettings => {
                if self.dialog.is_none() {
                    self.dialog = Some(self.controller.open());
                }
                Ok(IntentOutcome::DialogOpened)
            }
            UserIntent::Save(values) => self.save(values),
            UserIntent::Cancel => match self.dialog.take() {
                Some(dialog) => {
                    self.controller.cancel(dialog);
                    Ok(IntentOutcome::Cancelled)
                }
                None => Ok(IntentOutcome::Ignored),
            },
            UserIntent::RestoreDefaults => {
                let dialog = self.dialog.as_mut().ok_or(ShellError::NoDialog)?;
                self.controller.restore_defaults(dialog);
                Ok(IntentOutcome::DefaultsRestored)
            }
            UserIntent::ToggleTheme => {
                if self.dialog.is_some() {
                    debug!("Theme toggle ignored while settings are open");
                    return Ok(IntentOutcome::Ignored);
                }
                let next = self.theme.toggled();
                self.controller
                    .update_stored(SettingKey::Theme, next.label().into())?;
                self.apply_theme(next);
                Ok(IntentOutcome::ThemeApplied(next))
            }
            UserIntent::SetRate(rate) => {
                let event = self.display.borrow_mut().set_rate(rate);
                if let Some(event) = event {
                    self.publish(AppEvent::Display(event));
                }
                let display = self.display.borrow();
                Ok(IntentOutcome::RateChanged {
                    rate_hz: display.rate_hz(),
                    interval_ms: display.interval_ms(),
                })
            }
            UserIntent::SetHeaterProfile(profile) => {
                let event = self.display.borrow_mut().set_heater_profile(profile);
                if let Some(event) = event {
                    self.publish(AppEvent::Display(event));
                }
                Ok(IntentOutcome::ProfileChanged(profile))
            }
            UserIntent::UpdateMetadata(metadata) => {
                self.metadata = metadata;
                Ok(IntentOutcome::MetadataUpdated)
            }
            UserIntent::ExportDemo { path } => self.export(path),
        }
    }

    fn save(&mut self, values: Vec<(SettingKey, SettingValue)>) -> Result<IntentOutcome, ShellError> {
        let dialog = self.dialog.as_mut().ok_or(ShellError::NoDialog)?;
        for (key, value) in &values {
            dialog.set_value(*key, value).map_err(SettingsError::from)?;
        }

        let saved = self.controller.save(dialog)?;
        self.dialog = None;
        self.apply_theme(saved.parse_choice(SettingKey::Theme));
        self.message = "Settings saved".to_string();
        Ok(IntentOutcome::Saved(saved))
    }

    fn export(&mut self, path: Option<PathBuf>) -> Result<IntentOutcome, ShellError> {
        let snapshot = self.controller.snapshot();
        let path = path.unwrap_or_else(|| default_export_path(&snapshot));

        match export_demo(&path, &snapshot, &self.metadata, Utc::now()) {
            Ok(report) => {
                if report.csv_fallback {
                    self.publish(AppEvent::Error(ErrorEvent::Warning {
                        code: "export.hdf5".to_string(),
                        message: "HDF5 is not available, saved as CSV".to_string(),
                    }));
                }
                self.publish(AppEvent::Export(ExportEvent::Completed {
                    path: report.path.clone(),
                    rows: report.rows,
                }));
                self.message = format!("Saved demo CSV to {}", report.path.display());
                Ok(IntentOutcome::Exported(report))
            }
            Err(e) => {
                warn!("Export failed: {}", e);
                self.publish(AppEvent::Export(ExportEvent::Failed {
                    path,
                    error: e.to_string(),
                }));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_bar_text() {
        let status = StatusBar::new("Ready", Duration::from_secs(3725), 25, true);
        assert_eq!(status.elapsed, "01:02:05");
        assert_eq!(status.rate, "25 Hz");
        assert_eq!(status.logging, "Logging ON");
        assert_eq!(status.to_string(), "Ready | 01:02:05 | 25 Hz | Logging ON");

        let status = StatusBar::new("Ready", Duration::ZERO, 1, false);
        assert_eq!(status.elapsed, "00:00:00");
        assert_eq!(status.logging, "Logging OFF");
    }

    #[test]
    fn test_splash_page_follows_setting() {
        let store = shared(SettingsStore::in_memory());
        let shell = ShellApp::new(store.clone(), Arc::new(EventBus::new()));
        assert_eq!(shell.page(), Page::Splash);

        store
            .borrow_mut()
            .set(SettingKey::Splash, SettingValue::Boolean(false))
            .unwrap();
        let shell = ShellApp::new(store, Arc::new(EventBus::new()));
        assert_eq!(shell.page(), Page::Start);
    }

    #[test]
    fn test_save_without_dialog() {
        let mut shell = ShellApp::new(shared(SettingsStore::in_memory()), Arc::new(EventBus::new()));
        assert!(matches!(
            shell.handle(UserIntent::Save(Vec::new())),
            Err(ShellError::NoDialog)
        ));
        assert_eq!(shell.handle(UserIntent::Cancel).unwrap(), IntentOutcome::Ignored);
    }
}
