//! Built-in bounded FIFO job queue
//!
//! Design:
//! - Fixed-capacity ring with `head` (next pop) and `tail` (next push)
//! - `slots_free` semaphore (starts at capacity) claimed by pushers
//! - `slots_used` semaphore (starts at 0) claimed by poppers
//! - Index updates inside a short SpinLock critical section
//!
//! A pusher owns its slot from the `slots_free` decrement until the
//! `slots_used` post, a popper symmetrically the other way, so the ring
//! storage itself needs no further synchronization. Contending producers
//! (or consumers) serialize on the semaphore and the index lock; committed
//! pushes dispatch in FIFO order.

use crate::sem::{PlatformSemaphore, Semaphore, SEM_VALUE_MAX};
use jobpool_core::job::Job;
use jobpool_core::queue::{JobQueue, QueueError, QueueFlags};
use jobpool_core::spinlock::SpinLock;

struct Ring {
    jobs: Box<[Option<Job>]>,
    head: usize,
    tail: usize,
}

/// Bounded multi-producer multi-consumer FIFO queue.
///
/// The default queue a pool uses when the caller supplies none.
pub struct FifoQueue {
    slots_free: PlatformSemaphore,
    slots_used: PlatformSemaphore,
    ring: SpinLock<Ring>,
    capacity: usize,
}

impl FifoQueue {
    /// Largest representable capacity
    pub const MAX_CAPACITY: usize = SEM_VALUE_MAX;

    /// Create a queue with the given fixed capacity.
    ///
    /// Zero capacity is invalid; capacities beyond the semaphore counting
    /// range report [`QueueError::Resource`].
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidArgument);
        }
        if capacity > Self::MAX_CAPACITY {
            return Err(QueueError::Resource);
        }

        let mut jobs = Vec::with_capacity(capacity);
        jobs.resize_with(capacity, || None);

        Ok(Self {
            slots_free: PlatformSemaphore::new(capacity as u32),
            slots_used: PlatformSemaphore::new(0),
            ring: SpinLock::new(Ring {
                jobs: jobs.into_boxed_slice(),
                head: 0,
                tail: 0,
            }),
            capacity,
        })
    }
}

impl JobQueue for FifoQueue {
    fn push(&self, job: Job, flags: QueueFlags) -> Result<(), QueueError> {
        if flags.is_blocking() {
            // Interrupted waits retry silently on the push side.
            while self.slots_free.acquire().is_err() {}
        } else if !self.slots_free.try_acquire() {
            return Err(QueueError::WouldBlock);
        }

        {
            let mut ring = self.ring.lock();
            let tail = ring.tail;
            ring.jobs[tail] = Some(job);
            ring.tail = (tail + 1) % self.capacity;
        }

        self.slots_used.post();
        Ok(())
    }

    fn pop(&self, flags: QueueFlags) -> Result<Job, QueueError> {
        if flags.is_blocking() {
            // Surface the interruption so the worker loop can check flags.
            self.slots_used
                .acquire()
                .map_err(|_| QueueError::Interrupted)?;
        } else if !self.slots_used.try_acquire() {
            return Err(QueueError::WouldBlock);
        }

        let job = {
            let mut ring = self.ring.lock();
            let head = ring.head;
            let job = ring.jobs[head].take();
            ring.head = (head + 1) % self.capacity;
            job
        };

        self.slots_free.post();
        Ok(job.expect("slot claimed through slots_used holds a job"))
    }

    fn len(&self) -> Option<usize> {
        Some(self.slots_used.value())
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobpool_core::id::JobId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn stamped(id: i64) -> Job {
        let mut job = Job::new(|| {});
        job.set_id(JobId::new(id));
        job
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            FifoQueue::new(0),
            Err(QueueError::InvalidArgument)
        ));
    }

    #[test]
    fn test_fifo_order() {
        let queue = FifoQueue::new(8).unwrap();
        for i in 0..8 {
            queue.push(stamped(i), QueueFlags::NO_BLOCK).unwrap();
        }
        for i in 0..8 {
            let job = queue.pop(QueueFlags::NO_BLOCK).unwrap();
            assert_eq!(job.id(), JobId::new(i));
        }
    }

    #[test]
    fn test_wraparound_keeps_order() {
        let queue = FifoQueue::new(4).unwrap();
        // Advance head/tail past the seam a few times
        for round in 0..5 {
            for i in 0..3 {
                queue
                    .push(stamped(round * 10 + i), QueueFlags::NO_BLOCK)
                    .unwrap();
            }
            for i in 0..3 {
                let job = queue.pop(QueueFlags::NO_BLOCK).unwrap();
                assert_eq!(job.id(), JobId::new(round * 10 + i));
            }
        }
    }

    #[test]
    fn test_no_block_full_returns_would_block() {
        let queue = FifoQueue::new(2).unwrap();
        queue.push(stamped(0), QueueFlags::NO_BLOCK).unwrap();
        queue.push(stamped(1), QueueFlags::NO_BLOCK).unwrap();

        let res = queue.push(stamped(2), QueueFlags::NO_BLOCK);
        assert_eq!(res.unwrap_err(), QueueError::WouldBlock);

        // The failed push must not have disturbed the queue
        assert_eq!(queue.len(), Some(2));
        assert_eq!(queue.pop(QueueFlags::NO_BLOCK).unwrap().id(), JobId::new(0));
    }

    #[test]
    fn test_no_block_empty_returns_would_block() {
        let queue = FifoQueue::new(2).unwrap();
        assert_eq!(
            queue.pop(QueueFlags::NO_BLOCK).unwrap_err(),
            QueueError::WouldBlock
        );
    }

    #[test]
    fn test_len_and_capacity() {
        let queue = FifoQueue::new(4).unwrap();
        assert_eq!(queue.len(), Some(0));
        assert_eq!(queue.capacity(), Some(4));

        queue.push(stamped(0), QueueFlags::NO_BLOCK).unwrap();
        assert_eq!(queue.len(), Some(1));
    }

    #[test]
    fn test_blocking_pop_woken_by_push() {
        let queue = Arc::new(FifoQueue::new(2).unwrap());
        let queue2 = Arc::clone(&queue);

        let handle = thread::spawn(move || queue2.pop(QueueFlags::BLOCK).unwrap().id());

        thread::sleep(Duration::from_millis(50));
        queue.push(stamped(99), QueueFlags::BLOCK).unwrap();

        assert_eq!(handle.join().unwrap(), JobId::new(99));
    }

    #[test]
    fn test_blocking_push_woken_by_pop() {
        let queue = Arc::new(FifoQueue::new(1).unwrap());
        queue.push(stamped(0), QueueFlags::BLOCK).unwrap();

        let queue2 = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            // Queue is full; this blocks until the main thread pops.
            queue2.push(stamped(1), QueueFlags::BLOCK).unwrap();
        });

        thread::sleep(Duration::from_millis(50));
        assert_eq!(queue.pop(QueueFlags::BLOCK).unwrap().id(), JobId::new(0));

        handle.join().unwrap();
        assert_eq!(queue.pop(QueueFlags::BLOCK).unwrap().id(), JobId::new(1));
    }

    #[test]
    fn test_concurrent_producers_consumers() {
        let queue = Arc::new(FifoQueue::new(16).unwrap());
        let popped = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];

        for _ in 0..2 {
            let queue = Arc::clone(&queue);
            handles.push(thread::spawn(move || {
                for i in 0..500 {
                    queue.push(stamped(i), QueueFlags::BLOCK).unwrap();
                }
            }));
        }
        for _ in 0..2 {
            let queue = Arc::clone(&queue);
            let popped = Arc::clone(&popped);
            handles.push(thread::spawn(move || {
                for _ in 0..500 {
                    queue.pop(QueueFlags::BLOCK).unwrap();
                    popped.fetch_add(1, Ordering::Relaxed);
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(popped.load(Ordering::Relaxed), 1000);
        assert_eq!(queue.len(), Some(0));
    }
}
