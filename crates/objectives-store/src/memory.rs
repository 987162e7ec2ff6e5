//! In-memory progress store for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use objectives_core::progress::ProgressSnapshot;
use objectives_core::traits::ProgressStore;

/// A progress store that lives as long as the process.
///
/// Counts saves so tests can assert when the engine persisted.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<ProgressSnapshot>>,
    save_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `snapshot`.
    pub fn with_snapshot(snapshot: ProgressSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            save_count: AtomicU32::new(0),
        }
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::Relaxed)
    }

    /// The currently held snapshot.
    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ProgressSnapshot>> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> Result<Option<ProgressSnapshot>> {
        Ok(self.lock().clone())
    }

    async fn save(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        self.save_count.fetch_add(1, Ordering::Relaxed);
        *self.lock() = Some(snapshot.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.lock() = None;
        Ok(())
    }
}
