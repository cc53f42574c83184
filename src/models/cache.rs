//! Publish-once, single-flight cache for model handles.
//!
//! Repeated requests against the same model/index pair must not re-pay
//! load cost, and concurrent first-time loads of one key must coalesce
//! into a single load instead of racing duplicates. Entries are never
//! mutated after publication; readers that arrive after the first publish
//! never block.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

struct Slot<T> {
    value: OnceLock<Arc<T>>,
    loading: Mutex<()>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            value: OnceLock::new(),
            loading: Mutex::new(()),
        }
    }
}

/// Per-key memoization of expensive loads.
pub struct ModelCache<T> {
    slots: Mutex<HashMap<String, Arc<Slot<T>>>>,
}

impl<T> ModelCache<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the published value for `key`, loading it on first use.
    ///
    /// Concurrent callers for the same unloaded key serialize behind a
    /// per-key lock; exactly one runs `load`, the rest observe its
    /// publication. A failed load publishes nothing, so the next caller
    /// retries.
    pub fn get_or_load<F>(&self, key: &str, load: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Slot::new()))
                .clone()
        };

        // Fast path: already published, no locks taken.
        if let Some(value) = slot.value.get() {
            return Ok(value.clone());
        }

        // Single-flight: one loader per key at a time.
        let _guard = slot
            .loading
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = slot.value.get() {
            return Ok(value.clone());
        }

        let value = Arc::new(load()?);
        let _ = slot.value.set(value.clone());
        Ok(value)
    }

    /// Peek at an already-published value without loading.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let slots = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|slot| slot.value.get().cloned())
    }

    /// Number of keys with a published value.
    pub fn loaded_count(&self) -> usize {
        let slots = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| slot.value.get().is_some())
            .count()
    }
}

impl<T> Default for ModelCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
