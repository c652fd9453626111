//! Per-key async mutual exclusion.
//!
//! Plans are the unit of mutual exclusion: every mutating use case holds the
//! lock for its plan id from load to persist. Different keys never contend.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Guard returned by [`KeyedLock::lock`]. The key is released on drop.
pub type KeyGuard = OwnedMutexGuard<()>;

/// A registry of one mutex per key.
///
/// Entries are held weakly, so a key with no outstanding guard is pruned on
/// the next acquisition.
#[derive(Clone, Default)]
pub struct KeyedLock {
    entries: Arc<Mutex<HashMap<String, Weak<Mutex<()>>>>>,
}

impl KeyedLock {
    /// Create an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> KeyGuard {
        let mutex = {
            let mut entries = self.entries.lock().await;
            entries.retain(|_, weak| weak.strong_count() > 0);

            if let Some(existing) = entries.get(key).and_then(Weak::upgrade) {
                existing
            } else {
                let created = Arc::new(Mutex::new(()));
                entries.insert(key.to_string(), Arc::downgrade(&created));
                created
            }
        };

        mutex.lock_owned().await
    }

    /// Number of keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|w| w.strong_count() > 0).count()
    }
}
