//! Job identifier type and allocator
//!
//! Ids are signed so the negative range can carry sentinels: `JobId::NONE`
//! marks an idle worker and `JobId::WAKE` marks the internal wake job.
//! Every id handed to a caller is non-negative.

use core::fmt;
use core::sync::atomic::{AtomicI64, Ordering};

/// Unique identifier for a job submitted to a pool.
///
/// Negative values never identify a real job. `JobId::NONE` (−1) is the
/// idle marker stored in worker descriptors, and `JobId::WAKE` (`i64::MIN`)
/// is reserved for the wake job the pool uses to kick blocked workers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct JobId(i64);

impl JobId {
    /// Sentinel stored in a worker descriptor when it runs no job
    pub const NONE: JobId = JobId(-1);

    /// Sentinel carried by the internal wake job
    pub const WAKE: JobId = JobId(i64::MIN);

    /// Largest id the allocator hands out before wrapping to 0
    pub const MAX: JobId = JobId(i64::MAX);

    /// Create a JobId from a raw value
    #[inline]
    pub const fn new(id: i64) -> Self {
        JobId(id)
    }

    /// Get the raw i64 value
    #[inline]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Check whether this id identifies a real job
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// Check if this is the wake-job sentinel
    #[inline]
    pub const fn is_wake(self) -> bool {
        self.0 == i64::MIN
    }

    /// Check if this is the idle marker
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == -1
    }
}

impl From<i64> for JobId {
    #[inline]
    fn from(id: i64) -> Self {
        JobId(id)
    }
}

impl From<JobId> for i64 {
    #[inline]
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wake() {
            write!(f, "JobId(WAKE)")
        } else if self.is_none() {
            write!(f, "JobId(NONE)")
        } else {
            write!(f, "JobId({})", self.0)
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "none")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Default for JobId {
    fn default() -> Self {
        JobId::NONE
    }
}

/// Monotonic job-id allocator.
///
/// Holds the previously issued id, starting at −1. `next()` commits the
/// successor with a CAS so concurrent callers observe distinct ids, and
/// uses release ordering so a consumer that sees the id also sees the job
/// it was stamped onto.
pub struct JobIdCounter {
    prev: AtomicI64,
}

impl JobIdCounter {
    /// Create a counter whose first `next()` returns 0
    pub const fn new() -> Self {
        JobIdCounter {
            prev: AtomicI64::new(-1),
        }
    }

    /// Create a counter that continues after `prev`
    ///
    /// Exists for overflow tests; production pools always start at −1.
    pub const fn with_prev(prev: i64) -> Self {
        JobIdCounter {
            prev: AtomicI64::new(prev),
        }
    }

    /// Last id handed out, or −1 if none yet
    #[inline]
    pub fn prev(&self) -> i64 {
        self.prev.load(Ordering::Relaxed)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "jid-overflow-check")] {
        impl JobIdCounter {
            /// Allocate the next id, wrapping `JobId::MAX` to 0.
            ///
            /// The wrap target is 0, never −1: negative ids signal errors.
            pub fn next(&self) -> JobId {
                let mut current = self.prev.load(Ordering::Relaxed);
                loop {
                    let next = if current == JobId::MAX.as_i64() {
                        0
                    } else {
                        current + 1
                    };
                    match self.prev.compare_exchange_weak(
                        current,
                        next,
                        Ordering::Release,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => return JobId::new(next),
                        Err(observed) => current = observed,
                    }
                }
            }
        }
    } else {
        impl JobIdCounter {
            /// Allocate the next id.
            ///
            /// With the overflow check compiled out an i64 cannot wrap
            /// within a program lifetime, so a plain increment suffices.
            pub fn next(&self) -> JobId {
                JobId::new(self.prev.fetch_add(1, Ordering::Release) + 1)
            }
        }
    }
}

impl Default for JobIdCounter {
    fn default() -> Self {
        JobIdCounter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_job_id_basics() {
        let id = JobId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert!(id.is_valid());
        assert!(!id.is_wake());
        assert!(!id.is_none());
    }

    #[test]
    fn test_job_id_sentinels() {
        assert!(JobId::NONE.is_none());
        assert!(!JobId::NONE.is_valid());
        assert!(JobId::WAKE.is_wake());
        assert!(!JobId::WAKE.is_valid());
        assert_eq!(JobId::default(), JobId::NONE);
    }

    #[test]
    fn test_counter_starts_at_zero() {
        let counter = JobIdCounter::new();
        assert_eq!(counter.prev(), -1);
        assert_eq!(counter.next(), JobId::new(0));
        assert_eq!(counter.next(), JobId::new(1));
        assert_eq!(counter.prev(), 1);
    }

    #[test]
    fn test_serial_ids_strictly_increase() {
        let counter = JobIdCounter::new();
        let mut last = -1;
        for _ in 0..1000 {
            let id = counter.next().as_i64();
            assert!(id > last);
            last = id;
        }
    }

    #[cfg(feature = "jid-overflow-check")]
    #[test]
    fn test_overflow_wraps_to_zero() {
        let counter = JobIdCounter::with_prev(JobId::MAX.as_i64() - 1);
        assert_eq!(counter.next(), JobId::MAX);
        assert_eq!(counter.next(), JobId::new(0));
    }

    #[test]
    fn test_concurrent_ids_distinct() {
        let counter = Arc::new(JobIdCounter::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let counter = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                let mut ids = Vec::with_capacity(1000);
                for _ in 0..1000 {
                    ids.push(counter.next().as_i64());
                }
                ids
            }));
        }

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(id >= 0);
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 4000);
    }
}
