//! Tree operation statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracked by a B-tree over its lifetime.
///
/// All fields are atomic so read-only operations (`search`, `in_order`,
/// `verify`) can record page fetches through a shared reference.
///
/// # Memory Ordering
/// `Ordering::Relaxed` throughout: the counters only need atomicity, not
/// synchronization with each other.
///
/// # Example
/// ```
/// use pagetree::{BTree, MemoryStore};
///
/// let mut tree: BTree<u32, _> = BTree::create(2, MemoryStore::new()).unwrap();
/// for k in 0..10 {
///     tree.insert(k).unwrap();
/// }
/// let snapshot = tree.stats().snapshot();
/// assert!(snapshot.splits >= 1);
/// ```
#[derive(Debug, Default)]
pub struct TreeStats {
    /// Node pages fetched from the backend.
    pub pages_read: AtomicU64,

    /// Node pages written back to the backend.
    pub pages_written: AtomicU64,

    /// Pages allocated (splits and root growth).
    pub pages_allocated: AtomicU64,

    /// Node splits performed by inserts.
    pub splits: AtomicU64,

    /// Node merges performed by deletes.
    pub merges: AtomicU64,

    /// Keys borrowed from a sibling during deletes.
    pub borrows: AtomicU64,
}

impl TreeStats {
    /// Create a stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a non-atomic snapshot for display or comparison.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
            pages_allocated: self.pages_allocated.load(Ordering::Relaxed),
            splits: self.splits.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
            borrows: self.borrows.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.pages_read.store(0, Ordering::Relaxed);
        self.pages_written.store(0, Ordering::Relaxed);
        self.pages_allocated.store(0, Ordering::Relaxed);
        self.splits.store(0, Ordering::Relaxed);
        self.merges.store(0, Ordering::Relaxed);
        self.borrows.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// A point-in-time copy of [`TreeStats`].
///
/// Plain integers: safe to print, compare, and diff across operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub pages_read: u64,
    pub pages_written: u64,
    pub pages_allocated: u64,
    pub splits: u64,
    pub merges: u64,
    pub borrows: u64,
}

impl StatsSnapshot {
    /// Total structural restructures (splits + merges + borrows).
    pub fn restructures(&self) -> u64 {
        self.splits + self.merges + self.borrows
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ reads: {}, writes: {}, allocs: {}, splits: {}, merges: {}, borrows: {} }}",
            self.pages_read,
            self.pages_written,
            self.pages_allocated,
            self.splits,
            self.merges,
            self.borrows
        )
    }
}
