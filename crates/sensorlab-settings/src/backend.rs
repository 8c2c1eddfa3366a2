//! Storage backends for the settings store
//!
//! A backend moves the raw string table to and from durable storage. The
//! table is keyed by category, then by key name:
//!
//! ```toml
//! [acq]
//! rate = "25"
//! ```
//!
//! Backends know nothing about the schema; decoding and validation happen in
//! the store. Hand-edited files may hold bare numbers or booleans; those are
//! read back as their string form, and anything that is not a scalar is
//! skipped.

use crate::error::{SettingsError, SettingsResult};
use sensorlab_core::{shared, Shared};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Raw persisted table: category -> key -> encoded value
pub type RawSettings = BTreeMap<String, BTreeMap<String, String>>;

/// Durable storage for the raw settings table
pub trait SettingsBackend {
    /// Read the whole table. A store that does not exist yet is empty.
    fn load(&self) -> SettingsResult<RawSettings>;

    /// Replace the whole table.
    fn save(&self, raw: &RawSettings) -> SettingsResult<()>;

    /// Human-readable location, for logging
    fn location(&self) -> String;
}

/// On-disk file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Settings file in JSON or TOML format
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    format: FileFormat,
}

impl FileBackend {
    /// Create a backend for `path`; the extension must be `.json` or `.toml`.
    pub fn new(path: impl Into<PathBuf>) -> SettingsResult<Self> {
        let path = path.into();
        let format = FileFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }
}

impl SettingsBackend for FileBackend {
    fn load(&self) -> SettingsResult<RawSettings> {
        if !self.path.exists() {
            return Ok(RawSettings::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(RawSettings::new());
        }

        match self.format {
            FileFormat::Json => raw_from_json(serde_json::from_str(&content)?),
            FileFormat::Toml => Ok(raw_from_toml(toml::from_str(&content)?)),
        }
    }

    fn save(&self, raw: &RawSettings) -> SettingsResult<()> {
        let content = match self.format {
            FileFormat::Json => serde_json::to_string_pretty(raw)?,
            FileFormat::Toml => toml::to_string_pretty(raw)?,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Stage next to the target, then rename over it
        let staging = self.path.with_extension("tmp");
        std::fs::write(&staging, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", staging.display(), e)))?;
        std::fs::rename(&staging, &self.path)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

fn raw_from_toml(table: toml::Table) -> RawSettings {
    let mut raw = RawSettings::new();
    for (category, entries) in table {
        let toml::Value::Table(entries) = entries else {
            warn!("Skipping non-table settings entry {}", category);
            continue;
        };
        let section = raw.entry(category.clone()).or_default();
        for (key, value) in entries {
            let encoded = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    warn!("Skipping {}/{}: {} is not a scalar", category, key, other.type_str());
                    continue;
                }
            };
            section.insert(key, encoded);
        }
    }
    raw
}

fn raw_from_json(value: serde_json::Value) -> SettingsResult<RawSettings> {
    let serde_json::Value::Object(table) = value else {
        return Err(SettingsError::LoadError(
            "settings file is not a JSON object".to_string(),
        ));
    };

    let mut raw = RawSettings::new();
    for (category, entries) in table {
        let serde_json::Value::Object(entries) = entries else {
            warn!("Skipping non-object settings entry {}", category);
            continue;
        };
        let section = raw.entry(category.clone()).or_default();
        for (key, value) in entries {
            let encoded = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => {
                    warn!("Skipping {}/{}: not a scalar", category, key);
                    continue;
                }
            };
            section.insert(key, encoded);
        }
    }
    Ok(raw)
}

#[derive(Debug, Default)]
struct MemoryState {
    raw: RawSettings,
    writes: usize,
    fail_writes: bool,
    fail_reads: bool,
}

/// In-memory backend
///
/// Clones share the same table, so a test can keep a handle while the store
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Shared<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            state: shared(MemoryState::default()),
        }
    }

    /// Backend pre-filled with `raw`
    pub fn with_raw(raw: RawSettings) -> Self {
        let backend = Self::new();
        backend.state.borrow_mut().raw = raw;
        backend
    }

    /// Current table contents
    pub fn raw(&self) -> RawSettings {
        self.state.borrow().raw.clone()
    }

    /// Number of successful saves
    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }

    /// Make subsequent saves fail with an I/O error
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    /// Make subsequent loads fail, as an unreadable store would
    pub fn set_fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }
}

impl SettingsBackend for MemoryBackend {
    fn load(&self) -> SettingsResult<RawSettings> {
        let state = self.state.borrow();
        if state.fail_reads {
            return Err(SettingsError::LoadError("memory store unreadable".to_string()));
        }
        Ok(state.raw.clone())
    }

    fn save(&self, raw: &RawSettings) -> SettingsResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(SettingsError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "memory store is read-only",
            )));
        }
        state.raw = raw.clone();
        state.writes += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawSettings {
        let mut raw = RawSettings::new();
        raw.entry("acq".to_string())
            .or_default()
            .insert("rate".to_string(), "25".to_string());
        raw.entry("ui".to_string())
            .or_default()
            .insert("theme".to_string(), "Light".to_string());
        raw
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            FileFormat::from_path(Path::new("a/settings.toml")).unwrap(),
            FileFormat::Toml
        );
        assert_eq!(
            FileFormat::from_path(Path::new("settings.json")).unwrap(),
            FileFormat::Json
        );
        assert!(FileBackend::new("settings.ini").is_err());
        assert!(FileBackend::new("settings").is_err());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("settings.toml")).unwrap();
        assert!(backend.load().unwrap().is_empty());
    }

    #[test]
    fn test_toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let backend = FileBackend::new(&path).unwrap();

        backend.save(&sample()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[acq]"));
        assert!(content.contains("rate = \"25\""));

        assert_eq!(backend.load().unwrap(), sample());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("settings.json")).unwrap();
        backend.save(&sample()).unwrap();
        assert_eq!(backend.load().unwrap(), sample());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let backend = FileBackend::new(&path).unwrap();
        assert!(matches!(
            backend.load(),
            Err(SettingsError::JsonError(_))
        ));
    }

    #[test]
    fn test_bare_scalars_are_read_as_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "[ui]\ntheme = \"Light\"\nsplash = false\n\n[acq]\nrate = 25\nbuffer = [1, 2]\n\n[heater]\nmax = 2.5\n",
        )
        .unwrap();

        let raw = FileBackend::new(&path).unwrap().load().unwrap();
        assert_eq!(raw["ui"]["theme"], "Light");
        assert_eq!(raw["ui"]["splash"], "false");
        assert_eq!(raw["acq"]["rate"], "25");
        assert_eq!(raw["heater"]["max"], "2.5");
        assert!(!raw["acq"].contains_key("buffer"));
    }

    #[test]
    fn test_json_numbers_are_read_as_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"acq": {"rate": 25, "ts": "Epoch ms"}, "adv": {"crc": true, "timeout": null}, "log": 3}"#,
        )
        .unwrap();

        let raw = FileBackend::new(&path).unwrap().load().unwrap();
        assert_eq!(raw["acq"]["rate"], "25");
        assert_eq!(raw["acq"]["ts"], "Epoch ms");
        assert_eq!(raw["adv"]["crc"], "true");
        assert!(!raw["adv"].contains_key("timeout"));
        assert!(!raw.contains_key("log"));

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            FileBackend::new(&path).unwrap().load(),
            Err(SettingsError::LoadError(_))
        ));
    }

    #[test]
    fn test_memory_backend_shares_state_between_clones() {
        let backend = MemoryBackend::new();
        let handle = backend.clone();

        backend.save(&sample()).unwrap();
        assert_eq!(handle.raw(), sample());
        assert_eq!(handle.writes(), 1);

        handle.set_fail_writes(true);
        assert!(backend.save(&RawSettings::new()).is_err());
        assert_eq!(handle.raw(), sample());
        assert_eq!(handle.writes(), 1);
    }
}
