//! Per-key writer slots
//!
//! Each key gets its own async mutex. Operations on the same key queue in
//! arrival order; operations on different keys never contend beyond the
//! brief map lookup.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Exclusive hold on one key's writer slot; released on drop
pub type KeyGuard = OwnedMutexGuard<()>;

/// Registry of per-key writer slots
///
/// Slots are created on first use and kept for the life of the store.
/// Removing a slot while tasks are queued on it would let a newcomer
/// create a second slot for the same key and run concurrently.
#[derive(Debug, Default)]
pub struct KeyLocks {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the key's writer slot
    ///
    /// Waiters are admitted first-come, first-served.
    pub async fn acquire(&self, key: &str) -> KeyGuard {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(
                slots
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        slot.lock_owned().await
    }
}
