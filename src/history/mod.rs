// In-memory snapshot history: bounded ring, oldest evicted first.
// Kept in timestamp order; late (out-of-order) snapshots are inserted at their sorted position.

pub mod aggregation;

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use crate::models::Snapshot;

pub const DEFAULT_HISTORY_CAPACITY: usize = 300;

pub struct HistoryBuffer {
    capacity: usize,
    ring: RwLock<VecDeque<Snapshot>>,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    /// `capacity` is raised to 1 if zero.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            ring: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.ring
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&self, snapshot: Snapshot) {
        let mut ring = self.ring.write().unwrap_or_else(PoisonError::into_inner);

        let in_order = ring
            .back()
            .is_none_or(|last| last.timestamp <= snapshot.timestamp);
        if in_order {
            if ring.len() == self.capacity {
                ring.pop_front();
            }
            ring.push_back(snapshot);
            return;
        }

        let full = ring.len() == self.capacity;
        if full && ring.front().is_some_and(|f| snapshot.timestamp < f.timestamp) {
            tracing::debug!(
                operation = "history_push",
                timestamp = snapshot.timestamp,
                "snapshot older than full history; dropped"
            );
            return;
        }
        tracing::debug!(
            operation = "history_push",
            timestamp = snapshot.timestamp,
            "out-of-order snapshot; inserting at sorted position"
        );
        if full {
            ring.pop_front();
        }
        let pos = ring.partition_point(|s| s.timestamp <= snapshot.timestamp);
        ring.insert(pos, snapshot);
    }

    /// Snapshots with `start <= timestamp < end`, oldest first.
    pub fn snapshots_between(&self, start: u64, end: u64) -> Vec<Snapshot> {
        self.ring
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.timestamp >= start && s.timestamp < end)
            .cloned()
            .collect()
    }

    /// Up to `count` most recent snapshots, oldest first.
    pub fn recent(&self, count: usize) -> Vec<Snapshot> {
        let ring = self.ring.read().unwrap_or_else(PoisonError::into_inner);
        let skip = ring.len().saturating_sub(count);
        ring.iter().skip(skip).cloned().collect()
    }

    /// Point-in-time copy of the whole buffer, oldest first.
    pub fn to_vec(&self) -> Vec<Snapshot> {
        self.ring
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.ring
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .cloned()
    }

    pub fn clear(&self) {
        self.ring
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
