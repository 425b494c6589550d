//! Counting semaphores for queue backpressure and quiescence signaling
//!
//! Every suspension point in the pool is a semaphore wait: producers on a
//! full queue, workers on an empty one, and the `wait()` caller on the
//! quiescence semaphore. Platform-specific implementations use the most
//! efficient primitive available.

use core::fmt;

/// Marker error: a blocking acquire was interrupted by a signal.
///
/// Only the futex implementation can produce this; callers either retry
/// (push paths) or surface it so pool flags get inspected (pop paths).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitInterrupted;

impl fmt::Display for WaitInterrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "semaphore wait interrupted")
    }
}

impl std::error::Error for WaitInterrupted {}

/// Largest value a semaphore can count to.
///
/// Queue capacities above this cannot be represented and are rejected at
/// construction.
pub const SEM_VALUE_MAX: usize = u32::MAX as usize;

/// Counting semaphore.
///
/// `post` on a semaphore already at [`SEM_VALUE_MAX`] is an unrecoverable
/// invariant violation: implementations log a diagnostic and abort the
/// process rather than corrupt the count.
pub trait Semaphore: Send + Sync {
    /// Decrement, waiting until the count is positive.
    ///
    /// Returns `Err(WaitInterrupted)` if a signal cut the wait short; the
    /// count is not decremented in that case.
    fn acquire(&self) -> Result<(), WaitInterrupted>;

    /// Decrement if the count is positive, without waiting.
    ///
    /// Returns `false` when the count was zero.
    fn try_acquire(&self) -> bool;

    /// Increment and wake one waiter.
    fn post(&self);

    /// Current count. Advisory: stale as soon as it is read.
    fn value(&self) -> usize;
}

// Platform-specific implementations
cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod futex_linux;
        pub use futex_linux::FutexSemaphore as PlatformSemaphore;
    } else {
        mod fallback;
        pub use fallback::FallbackSemaphore as PlatformSemaphore;
    }
}

/// Create a boxed platform-appropriate semaphore with the given count
pub fn new_semaphore(initial: u32) -> Box<dyn Semaphore> {
    Box::new(PlatformSemaphore::new(initial))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_initial_value() {
        let sem = PlatformSemaphore::new(3);
        assert_eq!(sem.value(), 3);
    }

    #[test]
    fn test_try_acquire_drains() {
        let sem = PlatformSemaphore::new(2);
        assert!(sem.try_acquire());
        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
        assert_eq!(sem.value(), 0);
    }

    #[test]
    fn test_post_restores() {
        let sem = PlatformSemaphore::new(0);
        assert!(!sem.try_acquire());
        sem.post();
        assert!(sem.try_acquire());
    }

    #[test]
    fn test_acquire_nonzero_returns_immediately() {
        let sem = PlatformSemaphore::new(1);
        sem.acquire().unwrap();
        assert_eq!(sem.value(), 0);
    }

    #[test]
    fn test_cross_thread_wake() {
        let sem = Arc::new(PlatformSemaphore::new(0));
        let sem2 = Arc::clone(&sem);

        let handle = thread::spawn(move || {
            while sem2.acquire().is_err() {}
        });

        // Give the thread time to block
        thread::sleep(Duration::from_millis(50));
        sem.post();

        handle.join().unwrap();
        assert_eq!(sem.value(), 0);
    }

    #[test]
    fn test_boxed_constructor() {
        let sem = new_semaphore(1);
        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
    }

    #[test]
    fn test_many_posts_many_acquires() {
        let sem = Arc::new(PlatformSemaphore::new(0));
        let mut handles = vec![];

        for _ in 0..4 {
            let sem = Arc::clone(&sem);
            handles.push(thread::spawn(move || {
                for _ in 0..500 {
                    while sem.acquire().is_err() {}
                }
            }));
        }
        for _ in 0..2000 {
            sem.post();
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sem.value(), 0);
    }
}
