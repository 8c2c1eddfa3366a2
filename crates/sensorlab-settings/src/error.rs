//! Error types for the settings crate.
//!
//! This module provides structured error types for the settings store, its
//! backends, and value validation.

use std::io;
use thiserror::Error;

/// A value rejected by the settings schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A numeric value outside the declared range.
    #[error("Value out of range for '{key}': {value} (allowed {min}..={max})")]
    OutOfRange {
        key: String,
        value: String,
        min: String,
        max: String,
    },

    /// A value that is not one of the declared choices.
    #[error("Invalid choice for '{key}': {value} (expected one of: {choices})")]
    InvalidChoice {
        key: String,
        value: String,
        choices: String,
    },

    /// A value of the wrong kind, or text that does not parse as that kind.
    #[error("Type mismatch for '{key}': expected {expected}, got {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },

    /// An unusable path value.
    #[error("Invalid path for '{key}': {reason}")]
    InvalidPath { key: String, reason: String },
}

impl ValidationError {
    /// The `category/key` path of the rejected setting.
    pub fn key(&self) -> &str {
        match self {
            Self::OutOfRange { key, .. }
            | Self::InvalidChoice { key, .. }
            | Self::TypeMismatch { key, .. }
            | Self::InvalidPath { key, .. } => key,
        }
    }
}

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A value failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A `category/key` path that is not part of the schema.
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    /// The backing file could not be loaded.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    /// The backing file could not be saved.
    #[error("Failed to save settings: {0}")]
    SaveError(String),

    /// The backing file extension is not a supported format.
    #[error("Unsupported settings format: {0}")]
    UnsupportedFormat(String),

    /// The configuration directory could not be found or created.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

impl SettingsError {
    /// Check if this error is a validation failure the user can correct.
    pub fn is_validation(&self) -> bool {
        matches!(self, SettingsError::Validation(_))
    }
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;
