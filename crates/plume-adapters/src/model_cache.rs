//! In-process cache of the active model identifier.
//!
//! The gateway resolves the configured model once and reuses it for the
//! life of the process. The cache is process-wide shared state with
//! "eventually correct after invalidation" semantics: after the configured
//! model changes, readers may keep seeing the old identifier until
//! `invalidate` runs. Writers are responsible for calling it.

use std::sync::{Arc, Mutex};

/// Cloneable handle to a shared model-identifier cache.
#[derive(Debug, Clone, Default)]
pub struct ModelCache {
    inner: Arc<Mutex<Option<String>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached identifier, if one has been resolved since the last
    /// invalidation.
    pub fn get(&self) -> Option<String> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set(&self, model: String) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = Some(model);
    }

    /// Drop the cached identifier so the next reader re-resolves it.
    pub fn invalidate(&self) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
