//! Single-slot prediction cache with a fixed time-to-live.
//!
//! Staleness is evaluated lazily on read: an expired record stays in memory
//! (and `stored_at` keeps reporting its time) until it is overwritten or
//! cleared. There is no eviction task.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};

use fxsignal_core::PredictionRecord;

/// How long a stored prediction is served before the next read misses.
pub const PREDICTION_TTL: Duration = Duration::from_secs(5 * 60);

/// Record and storage instant; always set and cleared together.
#[derive(Debug, Clone)]
struct CacheEntry {
    record: PredictionRecord,
    stored_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Slot {
    entry: Option<CacheEntry>,
    /// Bumped by every `clear`.
    generation: u64,
}

#[derive(Debug)]
pub struct PredictionCache {
    ttl: chrono::Duration,
    slot: Mutex<Slot>,
}

impl Default for PredictionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionCache {
    /// Empty cache with the standard five-minute TTL.
    pub fn new() -> Self {
        Self::with_ttl(PREDICTION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Fresh record as of now, or `None` on a miss.
    pub fn read(&self) -> Option<PredictionRecord> {
        self.read_at(Utc::now())
    }

    /// Fresh record iff `now - stored_at < ttl`. Never mutates the slot.
    pub fn read_at(&self, now: DateTime<Utc>) -> Option<PredictionRecord> {
        self.lock()
            .entry
            .as_ref()
            .filter(|entry| now - entry.stored_at < self.ttl)
            .map(|entry| entry.record.clone())
    }

    /// Replace record and timestamp in one step.
    pub fn write(&self, record: PredictionRecord, now: DateTime<Utc>) {
        self.lock().entry = Some(CacheEntry {
            record,
            stored_at: now,
        });
    }

    /// Write only if no `clear` happened since `generation` was observed.
    ///
    /// Returns whether the record was stored. A result computed before an
    /// invalidation must not outlive it.
    pub fn write_if_current(&self, record: PredictionRecord, now: DateTime<Utc>, generation: u64) -> bool {
        let mut slot = self.lock();
        if slot.generation != generation {
            return false;
        }
        slot.entry = Some(CacheEntry {
            record,
            stored_at: now,
        });
        true
    }

    /// Empty the slot and start a new generation.
    pub fn clear(&self) {
        let mut slot = self.lock();
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
    }

    /// Current generation, to pass to [`write_if_current`](Self::write_if_current).
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// When the current record was stored, fresh or not.
    pub fn stored_at(&self) -> Option<DateTime<Utc>> {
        self.lock().entry.as_ref().map(|entry| entry.stored_at)
    }

    /// Record and storage instant as one consistent pair, fresh or not.
    pub fn peek(&self) -> Option<(PredictionRecord, DateTime<Utc>)> {
        self.lock()
            .entry
            .as_ref()
            .map(|entry| (entry.record.clone(), entry.stored_at))
    }

    // Every mutation replaces whole fields, so a poisoned guard still holds a
    // consistent pair.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
