//! The unit of work handed to a pool
//!
//! A job couples an allocator-stamped [`JobId`] with a boxed closure. The
//! closure's return value is discarded by the pool; callers that need a
//! result route it through the closure's captures. Jobs move by value
//! through the queue, so each queue entry owns its payload outright.

use crate::id::JobId;

/// Boxed job body. The argument is captured; the return value is dropped.
pub type JobFn = Box<dyn FnOnce() + Send + 'static>;

enum Payload {
    Run(JobFn),
    /// Sentinel posted by the pool solely to unblock a popper
    Wake,
}

/// A unit of work: an id plus the closure to run.
pub struct Job {
    id: JobId,
    payload: Payload,
}

impl Job {
    /// Create an unstamped job; the pool assigns the real id at push.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Job {
            id: JobId::NONE,
            payload: Payload::Run(Box::new(f)),
        }
    }

    /// Create the wake sentinel.
    ///
    /// Workers that pop one skip execution and go straight to flag
    /// handling. Custom queue implementations treat it like any other
    /// job; only its id distinguishes it.
    pub fn wake() -> Self {
        Job {
            id: JobId::WAKE,
            payload: Payload::Wake,
        }
    }

    /// The id stamped on this job
    #[inline]
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Stamp the job with its allocated id
    #[inline]
    pub fn set_id(&mut self, id: JobId) {
        self.id = id;
    }

    /// Check if this is the wake sentinel
    #[inline]
    pub fn is_wake(&self) -> bool {
        matches!(self.payload, Payload::Wake)
    }

    /// Execute the job body, consuming the job.
    ///
    /// Running the wake sentinel is a no-op.
    pub fn run(self) {
        match self.payload {
            Payload::Run(f) => f(),
            Payload::Wake => {}
        }
    }
}

impl core::fmt::Debug for Job {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("wake", &self.is_wake())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_job_runs_closure() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let job = Job::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(job.id(), JobId::NONE);
        job.run();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stamping() {
        let mut job = Job::new(|| {});
        job.set_id(JobId::new(7));
        assert_eq!(job.id(), JobId::new(7));
        assert!(!job.is_wake());
    }

    #[test]
    fn test_wake_sentinel() {
        let job = Job::wake();
        assert!(job.is_wake());
        assert_eq!(job.id(), JobId::WAKE);
        job.run(); // No-op, must not panic
    }
}
