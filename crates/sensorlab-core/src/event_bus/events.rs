//! Event type definitions for the event bus.
//!
//! This module defines all application events organized by category.
//! Events are cloneable and serializable so they can be logged or replayed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root event enum for all application events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Settings store and editor events
    Settings(SettingsEvent),
    /// Live display events
    Display(DisplayEvent),
    /// User interface events
    Ui(UiEvent),
    /// Data export events
    Export(ExportEvent),
    /// Error and diagnostic events
    Error(ErrorEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Settings(_) => EventCategory::Settings,
            AppEvent::Display(_) => EventCategory::Display,
            AppEvent::Ui(_) => EventCategory::Ui,
            AppEvent::Export(_) => EventCategory::Export,
            AppEvent::Error(_) => EventCategory::Error,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Settings(e) => e.description(),
            AppEvent::Display(e) => e.description(),
            AppEvent::Ui(e) => e.description(),
            AppEvent::Export(e) => e.description(),
            AppEvent::Error(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Settings store and editor events.
    Settings,
    /// Live display events.
    Display,
    /// User interface events.
    Ui,
    /// Data export events.
    Export,
    /// Error and diagnostic events.
    Error,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Settings => write!(f, "Settings"),
            EventCategory::Display => write!(f, "Display"),
            EventCategory::Ui => write!(f, "Ui"),
            EventCategory::Export => write!(f, "Export"),
            EventCategory::Error => write!(f, "Error"),
        }
    }
}

/// Settings-related events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SettingsEvent {
    /// A single key was written.
    Changed {
        /// Setting path (`category/key`).
        key: String,
        /// Encoded new value.
        value: String,
    },
    /// The editor saved all of its fields.
    Saved {
        /// Paths whose effective value differs from before the save.
        changed: Vec<String>,
    },
    /// The editor rejected a save.
    Rejected {
        /// Setting path that failed validation.
        key: String,
        /// Validation message.
        reason: String,
    },
    /// The editor was closed without saving.
    Cancelled,
}

impl SettingsEvent {
    fn description(&self) -> String {
        match self {
            SettingsEvent::Changed { key, value } => format!("Setting: {} = {}", key, value),
            SettingsEvent::Saved { changed } => {
                format!("Settings saved ({} changed)", changed.len())
            }
            SettingsEvent::Rejected { key, reason } => {
                format!("Settings rejected at {}: {}", key, reason)
            }
            SettingsEvent::Cancelled => "Settings cancelled".to_string(),
        }
    }
}

/// Live display events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DisplayEvent {
    /// The update loop started.
    Started {
        /// Initial refresh interval in milliseconds.
        interval_ms: u64,
    },
    /// The refresh interval changed.
    IntervalChanged {
        /// New refresh interval in milliseconds.
        interval_ms: u64,
    },
    /// The number of visible channel slots changed.
    ChannelsChanged {
        /// Number of visible slots.
        visible: usize,
    },
    /// The selected heater profile label changed.
    ProfileChanged {
        /// Label of the selected profile.
        profile: String,
    },
}

impl DisplayEvent {
    fn description(&self) -> String {
        match self {
            DisplayEvent::Started { interval_ms } => {
                format!("Display running every {}ms", interval_ms)
            }
            DisplayEvent::IntervalChanged { interval_ms } => {
                format!("Display interval: {}ms", interval_ms)
            }
            DisplayEvent::ChannelsChanged { visible } => {
                format!("Visible channels: {}", visible)
            }
            DisplayEvent::ProfileChanged { profile } => format!("Heater profile: {}", profile),
        }
    }
}

/// Top-level page of the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    /// Splash screen shown at startup.
    Splash,
    /// Start screen with the start and settings buttons.
    Start,
    /// Live dashboard.
    Dashboard,
}

/// UI-related events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UiEvent {
    /// Active page changed.
    PageChanged {
        /// The new active page.
        page: Page,
    },
    /// Theme changed.
    ThemeChanged {
        /// Label of the applied theme.
        theme: String,
    },
    /// Dialog opened.
    DialogOpened {
        /// Name of the dialog that was opened.
        dialog: String,
    },
    /// Dialog closed.
    DialogClosed {
        /// Name of the dialog that was closed.
        dialog: String,
    },
}

impl UiEvent {
    fn description(&self) -> String {
        match self {
            UiEvent::PageChanged { page } => format!("Page: {:?}", page),
            UiEvent::ThemeChanged { theme } => format!("Theme: {}", theme),
            UiEvent::DialogOpened { dialog } => format!("Dialog opened: {}", dialog),
            UiEvent::DialogClosed { dialog } => format!("Dialog closed: {}", dialog),
        }
    }
}

/// Data export events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExportEvent {
    /// Export finished.
    Completed {
        /// File that was written.
        path: PathBuf,
        /// Number of data rows written.
        rows: usize,
    },
    /// Export failed.
    Failed {
        /// Target path of the failed export.
        path: PathBuf,
        /// Error message.
        error: String,
    },
}

impl ExportEvent {
    fn description(&self) -> String {
        match self {
            ExportEvent::Completed { path, rows } => {
                format!("Exported {} rows to {}", rows, path.display())
            }
            ExportEvent::Failed { path, error } => {
                format!("Export to {} failed: {}", path.display(), error)
            }
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Non-critical warning that does not block operation.
    Warning,
    /// Error that may be recoverable.
    Error,
}

/// Error and diagnostic events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ErrorEvent {
    /// Warning (non-blocking).
    Warning {
        /// Warning code identifier.
        code: String,
        /// Human-readable warning message.
        message: String,
    },
    /// Error (recoverable; nothing in SensorLab is fatal).
    Error {
        /// Error code identifier.
        code: String,
        /// Human-readable error message.
        message: String,
    },
}

impl ErrorEvent {
    fn description(&self) -> String {
        match self {
            ErrorEvent::Warning { code, message } => {
                format!("Warning [{}]: {}", code, message)
            }
            ErrorEvent::Error { code, message } => {
                format!("Error [{}]: {}", code, message)
            }
        }
    }

    /// Get the severity of this error event
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorEvent::Warning { .. } => ErrorSeverity::Warning,
            ErrorEvent::Error { .. } => ErrorSeverity::Error,
        }
    }
}
