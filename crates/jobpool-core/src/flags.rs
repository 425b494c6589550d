//! Pool coordination flags
//!
//! A single atomic word carries the lifecycle bits workers sample after
//! each drain. Each bit has one setter: `WAIT` is owned by the thread
//! inside `wait()`, `KILL_N` by `remove_threads` (set) and the retiring
//! worker that drains the quota (clear).

use core::sync::atomic::{AtomicU32, Ordering};

/// Quiescence requested; workers post the sync semaphore when idle
pub const FLAG_WAIT: u32 = 1 << 0;

/// One or more worker retirements owed; see the kill quota
pub const FLAG_KILL_N: u32 = 1 << 1;

/// Atomic pool flag word.
///
/// Flag transitions use sequentially consistent ordering: they order the
/// kill quota and working counts the workers read right after sampling.
#[derive(Debug, Default)]
pub struct PoolFlags(AtomicU32);

impl PoolFlags {
    /// Create a cleared flag word
    pub const fn new() -> Self {
        PoolFlags(AtomicU32::new(0))
    }

    /// Set the given bit(s)
    #[inline]
    pub fn set(&self, bits: u32) {
        self.0.fetch_or(bits, Ordering::SeqCst);
    }

    /// Clear the given bit(s)
    #[inline]
    pub fn clear(&self, bits: u32) {
        self.0.fetch_and(!bits, Ordering::SeqCst);
    }

    /// Snapshot the whole word
    #[inline]
    pub fn snapshot(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    /// Check whether all of `bits` are currently set
    #[inline]
    pub fn contains(&self, bits: u32) -> bool {
        self.snapshot() & bits == bits
    }
}
