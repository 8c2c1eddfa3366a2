//! Type aliases for commonly used complex types.
//!
//! Complex types like `Rc<RefCell<Vec<Box<dyn Fn(&T)>>>>` are hard to read at a
//! glance. The aliases here give them names that convey intent and keep the
//! same pattern in use across crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sensorlab_core::types::*;
//!
//! // Instead of: Rc<RefCell<SettingsStore>>
//! let store: Shared<SettingsStore> = shared(SettingsStore::in_memory());
//! ```

use parking_lot::RwLock;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

// =============================================================================
// SINGLE-THREADED SHARED TYPES (Rc<RefCell<T>>)
// =============================================================================

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
///
/// The whole application runs on one UI thread, so the settings store and the
/// live display are handed around as `Shared<T>`.
pub type Shared<T> = Rc<RefCell<T>>;

/// A shared vector for single-threaded collection management.
pub type SharedVec<T> = Rc<RefCell<Vec<T>>>;

/// A list of single-threaded listeners receiving a borrowed payload.
pub type ListenerList<T> = SharedVec<Box<dyn Fn(&T)>>;

// =============================================================================
// THREAD-SAFE SHARED TYPES
// =============================================================================

/// A thread-safe, read-write-locked hash map.
///
/// Uses `parking_lot::RwLock` for better performance than `std::sync::RwLock`.
pub type ThreadSafeRwMap<K, V> = Arc<RwLock<HashMap<K, V>>>;

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// Wrap a value for single-threaded sharing.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Create an empty shared vector.
pub fn shared_vec<T>() -> SharedVec<T> {
    Rc::new(RefCell::new(Vec::new()))
}

/// Create an empty thread-safe map.
pub fn thread_safe_rw_map<K, V>() -> ThreadSafeRwMap<K, V> {
    Arc::new(RwLock::new(HashMap::new()))
}
