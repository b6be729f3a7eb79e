// Single-slot TTL cache for the latest snapshot.
// Expiry is computed on read; a stale entry stays stored until replaced or cleared.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::time::{Duration, Instant};

use crate::models::Snapshot;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(500);

pub struct SnapshotCache {
    ttl: Duration,
    slot: Mutex<Option<(Snapshot, Instant)>>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached snapshot if it was stored less than `ttl` ago.
    pub fn get(&self) -> Option<Snapshot> {
        let slot = self.lock();
        match &*slot {
            Some((snapshot, stored_at)) if stored_at.elapsed() < self.ttl => {
                Some(snapshot.clone())
            }
            _ => None,
        }
    }

    pub fn put(&self, snapshot: Snapshot) {
        *self.lock() = Some((snapshot, Instant::now()));
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn is_valid(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|(_, stored_at)| stored_at.elapsed() < self.ttl)
    }

    /// Milliseconds since the last `put`, or -1 when the slot is empty.
    pub fn age_ms(&self) -> i64 {
        match &*self.lock() {
            Some((_, stored_at)) => stored_at.elapsed().as_millis() as i64,
            None => -1,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<(Snapshot, Instant)>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
