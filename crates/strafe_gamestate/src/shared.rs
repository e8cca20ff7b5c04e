//! Shared handle to the level progress for multi-threaded hosts
//!
//! The level session owns a plain [`GameProgress`] and mutates it from its
//! own tick. Hosts that count progress from other threads (HUD, stats
//! upload, scripted triggers) wrap a copy in a [`ProgressHandle`] and hand
//! clones to each of them.

use crate::progress::GameProgress;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Cloneable handle serialising progress mutations.
///
/// Every mutation locks once, so increment-then-observe is atomic.
#[derive(Debug, Clone, Default)]
pub struct ProgressHandle {
    inner: Arc<Mutex<GameProgress>>,
}

impl ProgressHandle {
    pub fn new(progress: GameProgress) -> Self {
        Self {
            inner: Arc::new(Mutex::new(progress)),
        }
    }

    /// Lock for several operations in one critical section
    pub fn lock(&self) -> MutexGuard<'_, GameProgress> {
        self.inner.lock()
    }

    /// Run a closure against the locked progress
    pub fn with<R>(&self, f: impl FnOnce(&mut GameProgress) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn record_kill(&self) -> u32 {
        self.inner.lock().record_kill()
    }

    pub fn record_secret(&self) -> u32 {
        self.inner.lock().record_secret()
    }

    pub fn set_keycard(&self, color: impl Into<String>) -> bool {
        self.inner.lock().set_keycard(color)
    }

    pub fn has_keycard(&self, color: &str) -> bool {
        self.inner.lock().has_keycard(color)
    }

    pub fn complete_level(&self) -> bool {
        self.inner.lock().complete_level()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> GameProgress {
        self.inner.lock().clone()
    }
}
