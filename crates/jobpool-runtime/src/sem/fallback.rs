//! Fallback counting semaphore using std::sync::Condvar
//!
//! Used on platforms without futex support. Condvar waits cannot observe
//! signal interruption, so `acquire` here never returns `WaitInterrupted`.

use super::{Semaphore, WaitInterrupted};
use jobpool_core::kerror;
use std::sync::{Condvar, Mutex};

/// Condvar-based semaphore (portable fallback)
pub struct FallbackSemaphore {
    count: Mutex<u32>,
    condvar: Condvar,
}

impl FallbackSemaphore {
    /// Create a semaphore with the given count
    pub fn new(initial: u32) -> Self {
        Self {
            count: Mutex::new(initial),
            condvar: Condvar::new(),
        }
    }
}

impl Semaphore for FallbackSemaphore {
    fn acquire(&self) -> Result<(), WaitInterrupted> {
        let mut count = self.count.lock().unwrap();
        while *count == 0 {
            count = self.condvar.wait(count).unwrap();
        }
        *count -= 1;
        Ok(())
    }

    fn try_acquire(&self) -> bool {
        let mut count = self.count.lock().unwrap();
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    fn post(&self) {
        {
            let mut count = self.count.lock().unwrap();
            if *count == u32::MAX {
                kerror!("semaphore count overflow, aborting");
                std::process::abort();
            }
            *count += 1;
        }
        self.condvar.notify_one();
    }

    fn value(&self) -> usize {
        *self.count.lock().unwrap() as usize
    }
}
