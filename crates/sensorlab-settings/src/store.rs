//! Settings store
//!
//! Durable `category/key` -> value mapping with defaulting. The backing table
//! is loaded lazily on first access and written through on every mutation.
//!
//! Reads never fail: a missing key, an invalid stored value, or an unreadable
//! backend all degrade to the declared default. Writes validate first and
//! reject anything outside the schema.

use crate::backend::{FileBackend, MemoryBackend, RawSettings, SettingsBackend};
use crate::error::{SettingsError, SettingsResult};
use crate::schema::{SettingKey, SettingValue, Snapshot};
use std::cell::RefCell;
use std::path::Path;
use tracing::{debug, warn};

/// Persistent settings store
pub struct SettingsStore {
    backend: Box<dyn SettingsBackend>,
    cache: RefCell<Option<RawSettings>>,
}

impl SettingsStore {
    pub fn new(backend: Box<dyn SettingsBackend>) -> Self {
        Self {
            backend,
            cache: RefCell::new(None),
        }
    }

    /// Store backed by a JSON or TOML file
    pub fn open(path: &Path) -> SettingsResult<Self> {
        Ok(Self::new(Box::new(FileBackend::new(path)?)))
    }

    /// Store backed by memory only
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    fn load_raw(backend: &dyn SettingsBackend) -> RawSettings {
        match backend.load() {
            Ok(raw) => {
                debug!(
                    location = %backend.location(),
                    categories = raw.len(),
                    "Settings loaded"
                );
                raw
            }
            Err(e) => {
                warn!(
                    location = %backend.location(),
                    "Settings unreadable, using defaults: {}",
                    e
                );
                RawSettings::new()
            }
        }
    }

    fn with_raw<R>(&self, f: impl FnOnce(&mut RawSettings) -> R) -> R {
        let mut cache = self.cache.borrow_mut();
        let raw = cache.get_or_insert_with(|| Self::load_raw(self.backend.as_ref()));
        f(raw)
    }

    /// Number of explicitly stored entries
    pub fn stored_len(&self) -> usize {
        self.with_raw(|raw| raw.values().map(|entries| entries.len()).sum())
    }

    /// Whether `key` has an explicitly stored entry
    pub fn contains(&self, key: SettingKey) -> bool {
        self.with_raw(|raw| {
            raw.get(key.category().as_str())
                .is_some_and(|entries| entries.contains_key(key.name()))
        })
    }

    /// Effective value of `key`
    pub fn get(&self, key: SettingKey) -> SettingValue {
        let stored = self.with_raw(|raw| {
            raw.get(key.category().as_str())
                .and_then(|entries| entries.get(key.name()))
                .cloned()
        });

        match stored {
            None => key.default_value(),
            Some(encoded) => key.decode(&encoded).unwrap_or_else(|e| {
                warn!("Ignoring stored {}: {}", key, e);
                key.default_value()
            }),
        }
    }

    /// Effective value addressed by `category/key` path
    pub fn get_path(&self, path: &str) -> SettingsResult<SettingValue> {
        let key =
            SettingKey::from_path(path).ok_or_else(|| SettingsError::UnknownKey(path.to_string()))?;
        Ok(self.get(key))
    }

    /// Snapshot of every effective value
    pub fn all(&self) -> Snapshot {
        Snapshot::from_fn(|key| self.get(key))
    }

    /// Validate and persist one value.
    ///
    /// On a validation failure nothing changes. On a backend failure the
    /// in-memory table is rolled back to match storage.
    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> SettingsResult<()> {
        self.set_many(&[(key, value)])
    }

    /// Decode `raw` for the key at `path` and persist it.
    pub fn set_str(&mut self, path: &str, raw: &str) -> SettingsResult<()> {
        let key =
            SettingKey::from_path(path).ok_or_else(|| SettingsError::UnknownKey(path.to_string()))?;
        let value = key.decode(raw)?;
        self.set(key, value)
    }

    /// Validate every value, then apply them all with one write.
    ///
    /// Either every value is stored or none is.
    pub fn set_many(&mut self, values: &[(SettingKey, SettingValue)]) -> SettingsResult<()> {
        let encoded = values
            .iter()
            .map(|(key, value)| key.validate(value).map(|v| (*key, v.encode())))
            .collect::<Result<Vec<_>, _>>()?;

        self.mutate(|raw| {
            for (key, value) in &encoded {
                raw.entry(key.category().as_str().to_string())
                    .or_default()
                    .insert(key.name().to_string(), value.clone());
            }
        })?;

        for (key, value) in &encoded {
            debug!("Setting stored: {} = {}", key, value);
        }
        Ok(())
    }

    /// Drop the stored entry so `key` reverts to its default.
    pub fn reset(&mut self, key: SettingKey) -> SettingsResult<()> {
        if !self.contains(key) {
            return Ok(());
        }

        self.mutate(|raw| {
            if let Some(entries) = raw.get_mut(key.category().as_str()) {
                entries.remove(key.name());
                if entries.is_empty() {
                    raw.remove(key.category().as_str());
                }
            }
        })?;

        debug!("Setting reset: {}", key);
        Ok(())
    }

    fn mutate(&mut self, f: impl FnOnce(&mut RawSettings)) -> SettingsResult<()> {
        let backend = self.backend.as_ref();
        let mut cache = self.cache.borrow_mut();
        let raw = cache.get_or_insert_with(|| Self::load_raw(backend));

        let previous = raw.clone();
        f(raw);

        if let Err(e) = backend.save(raw) {
            warn!(location = %backend.location(), "Settings write failed: {}", e);
            *raw = previous;
            return Err(e);
        }
        Ok(())
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("location", &self.backend.location())
            .field("loaded", &self.cache.borrow().is_some())
            .finish()
    }
}
