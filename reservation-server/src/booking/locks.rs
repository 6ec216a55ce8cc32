//! Per-slot write locks
//!
//! Every write that assigns a table holds the lock of its (date, time) slot
//! until its transaction commits. Reads never take these locks.

use chrono::{NaiveDate, NaiveTime};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type SlotKey = (NaiveDate, NaiveTime);

/// Async mutex registry keyed by slot
#[derive(Debug, Default, Clone)]
pub struct SlotLocks {
    inner: Arc<DashMap<SlotKey, Arc<Mutex<()>>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a slot
    pub async fn lock(&self, date: NaiveDate, time: NaiveTime) -> SlotGuard {
        let key = (date, time);
        // clone the Arc out so the shard lock is released before awaiting
        let mutex = self
            .inner
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        SlotGuard {
            locks: self.inner.clone(),
            key,
            guard: Some(guard),
        }
    }

    /// Slots currently tracked (held or awaited)
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Held slot lock; the map entry is dropped with the last user
#[derive(Debug)]
pub struct SlotGuard {
    locks: Arc<DashMap<SlotKey, Arc<Mutex<()>>>>,
    key: SlotKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        // release first so the guard's own Arc no longer counts
        drop(self.guard.take());
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
