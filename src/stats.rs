//! Store statistics
//!
//! Lock-free counters kept by each store instance. Corrupt artifacts are
//! absorbed as missing documents, so `corrupt_artifacts` is how an operator
//! (or a test) sees that data went unreadable.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a store's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// `get` calls
    pub reads: u64,

    /// `get` calls answered from the cache
    pub cache_hits: u64,

    /// Successful durable writes
    pub writes: u64,

    /// Artifacts removed by `delete`
    pub deletes: u64,

    /// Reads that found an unparsable artifact
    pub corrupt_artifacts: u64,
}

/// Live counters (atomic, lock-free)
#[derive(Debug, Default)]
pub(crate) struct Counters {
    reads: AtomicU64,
    cache_hits: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
    corrupt_artifacts: AtomicU64,
}

impl Counters {
    pub(crate) fn record_read(&self, cache_hit: bool) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if cache_hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_corrupt(&self) {
        self.corrupt_artifacts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StoreStats {
        StoreStats {
            reads: self.reads.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            corrupt_artifacts: self.corrupt_artifacts.load(Ordering::Relaxed),
        }
    }
}
