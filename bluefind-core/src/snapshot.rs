//! Atomic snapshot publication
//!
//! One writer replaces the whole value; readers clone the current `Arc` and
//! work from it for as long as they like. A reader never sees a value in
//! the middle of an update, and the lock is held only for the pointer swap.

use std::sync::{Arc, RwLock};

/// Shared cell holding the latest published `Arc<T>`
#[derive(Debug)]
pub struct SnapshotCell<T> {
    slot: Arc<RwLock<Arc<T>>>,
}

impl<T> Clone for SnapshotCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(Arc::new(T::default()))
    }
}

impl<T> SnapshotCell<T> {
    /// Cell holding `initial`
    pub fn new(initial: Arc<T>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(initial)),
        }
    }

    /// Replace the published value
    pub fn publish(&self, value: Arc<T>) {
        // A poisoned lock still holds a complete Arc; keep going.
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = value;
    }

    /// Latest published value
    pub fn load(&self) -> Arc<T> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&slot)
    }
}
