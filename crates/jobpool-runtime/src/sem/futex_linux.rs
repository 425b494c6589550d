//! Linux futex-based counting semaphore
//!
//! The futex word is the count itself:
//! - `acquire()` CAS-decrements when positive, otherwise FUTEX_WAITs on 0
//! - `post()` increments and FUTEX_WAKEs one waiter
//!
//! EINTR from the wait surfaces as [`WaitInterrupted`] so pop paths can
//! inspect pool flags; every other wake reason loops back to the CAS.

use super::{Semaphore, WaitInterrupted};
use jobpool_core::kerror;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Futex-backed semaphore
pub struct FutexSemaphore {
    /// Futex word: the current count
    count: AtomicU32,

    /// Number of threads inside FUTEX_WAIT (wake-skip optimization)
    waiters: AtomicUsize,
}

impl FutexSemaphore {
    /// Create a semaphore with the given count
    pub fn new(initial: u32) -> Self {
        Self {
            count: AtomicU32::new(initial),
            waiters: AtomicUsize::new(0),
        }
    }

    /// Try to CAS the count down by one. Returns false when it is zero.
    fn try_decrement(&self) -> bool {
        let mut current = self.count.load(Ordering::Acquire);
        while current > 0 {
            match self.count.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
        false
    }

    fn futex_wait(&self) -> Result<(), WaitInterrupted> {
        let rc = unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.count.as_ptr(),
                libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
                0u32, // Sleep only while the count is zero
                std::ptr::null::<libc::timespec>(),
                std::ptr::null::<u32>(),
                0u32,
            )
        };
        if rc == -1 {
            if let Some(libc::EINTR) = std::io::Error::last_os_error().raw_os_error() {
                return Err(WaitInterrupted);
            }
            // EAGAIN: the count changed before we slept. Not an error.
        }
        Ok(())
    }

    fn futex_wake_one(&self) {
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.count.as_ptr(),
                libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
                1i32,
                std::ptr::null::<libc::timespec>(),
                std::ptr::null::<u32>(),
                0u32,
            );
        }
    }
}

impl Semaphore for FutexSemaphore {
    fn acquire(&self) -> Result<(), WaitInterrupted> {
        loop {
            if self.try_decrement() {
                return Ok(());
            }

            self.waiters.fetch_add(1, Ordering::SeqCst);
            let waited = self.futex_wait();
            self.waiters.fetch_sub(1, Ordering::SeqCst);
            waited?;
        }
    }

    fn try_acquire(&self) -> bool {
        self.try_decrement()
    }

    fn post(&self) {
        let prev = self.count.fetch_add(1, Ordering::Release);
        if prev == u32::MAX {
            // The count wrapped: some acquire/post pairing is broken and
            // the queue invariants are gone. There is no safe recovery.
            kerror!("semaphore count overflow, aborting");
            std::process::abort();
        }

        if self.waiters.load(Ordering::Acquire) > 0 {
            self.futex_wake_one();
        }
    }

    fn value(&self) -> usize {
        self.count.load(Ordering::Acquire) as usize
    }
}

// Safety: FutexSemaphore only contains atomics
unsafe impl Send for FutexSemaphore {}
unsafe impl Sync for FutexSemaphore {}
