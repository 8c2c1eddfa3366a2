//! Error handling for SensorLab
//!
//! Provides error types for the runtime side of the application:
//! - Display errors (channel slots, refresh loop)
//! - Export errors (demo data files)
//!
//! Settings errors live in the settings crate. All error types use
//! `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Live display error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DisplayError {
    /// A channel slot index outside the fixed slot array
    #[error("Channel {index} out of range (display has {count} slots)")]
    ChannelOutOfRange {
        /// The requested slot index.
        index: usize,
        /// The number of slots the display owns.
        count: usize,
    },

    /// A refresh interval that would stall the update loop
    #[error("Invalid refresh interval: {interval_ms}ms")]
    InvalidInterval {
        /// The rejected interval in milliseconds.
        interval_ms: u64,
    },
}

/// Data export error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// Target directory is missing
    #[error("Export directory does not exist: {path}")]
    MissingDirectory {
        /// The directory that was expected to exist.
        path: String,
    },

    /// Export target has no file name
    #[error("Export path has no file name: {path}")]
    InvalidTarget {
        /// The rejected path.
        path: String,
    },
}

/// Main error type for SensorLab
///
/// A unified error type for the display and export layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Display error
    #[error(transparent)]
    Display(#[from] DisplayError),

    /// Export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a display error
    pub fn is_display_error(&self) -> bool {
        matches!(self, Error::Display(_))
    }

    /// Check if this is an export error
    pub fn is_export_error(&self) -> bool {
        matches!(self, Error::Export(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
