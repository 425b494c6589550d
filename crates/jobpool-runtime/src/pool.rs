//! Pool core
//!
//! Owns the queue, the worker registry, the job-id allocator, and the
//! coordination state (flags, kill quota, quiescence semaphore). All
//! lifecycle operations funnel through here.
//!
//! Worker coordination never touches a worker directly: lifecycle events
//! set pool flags and, when a worker might be parked inside the queue's
//! blocking pop, post a wake job to kick one out. Retiring workers relay
//! further wakes while the kill quota stays positive.

use crate::config::PoolConfig;
use crate::registry::{Registry, WorkerEntry, WorkerHandle};
use crate::sem::{new_semaphore, Semaphore};
use crate::worker::{worker_loop, WorkerArgs};
use jobpool_core::error::{PoolError, PoolResult};
use jobpool_core::flags::{PoolFlags, FLAG_KILL_N, FLAG_WAIT};
use jobpool_core::id::{JobId, JobIdCounter};
use jobpool_core::job::Job;
use jobpool_core::kprint;
use jobpool_core::ktrace;
use jobpool_core::queue::{JobQueue, QueueError, QueueFlags};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[cfg(feature = "fifo-queue")]
use crate::fifo::FifoQueue;

/// The queue a pool dispatches through: the built-in FIFO or a
/// caller-supplied implementation.
enum QueueHandle {
    #[cfg(feature = "fifo-queue")]
    Builtin(FifoQueue),
    Custom(Box<dyn JobQueue>),
}

/// State shared between the pool handle and every worker thread.
///
/// Workers hold an `Arc` to this, so collaborators stay alive until the
/// last worker is gone regardless of when the pool handle drops.
pub(crate) struct PoolShared {
    pub(crate) registry: Registry,
    pub(crate) job_ids: JobIdCounter,
    queue: QueueHandle,
    pub(crate) threads_total: AtomicUsize,
    pub(crate) threads_working: AtomicUsize,
    pub(crate) kill_quota: AtomicI64,
    pub(crate) quiesce: Box<dyn Semaphore>,
    pub(crate) flags: PoolFlags,
    shut_down: AtomicBool,
    worker_seq: AtomicUsize,
}

impl PoolShared {
    pub(crate) fn queue(&self) -> &dyn JobQueue {
        match &self.queue {
            #[cfg(feature = "fifo-queue")]
            QueueHandle::Builtin(q) => q,
            QueueHandle::Custom(q) => q.as_ref(),
        }
    }
}

/// A fixed-capacity worker pool.
///
/// Workers pop jobs from a bounded queue and run them; the pool exposes
/// push, quiescence wait, worker add/remove, and teardown. Dropping the
/// pool shuts it down.
pub struct Pool {
    shared: Arc<PoolShared>,
}

impl Pool {
    /// Create a pool using the built-in FIFO queue.
    ///
    /// Fails with `InvalidSize` when a size is zero, `SemRange` when the
    /// queue length exceeds the semaphore range, and a spawn error when
    /// worker threads cannot start. Partial setup is rolled back.
    #[cfg(feature = "fifo-queue")]
    pub fn new(config: PoolConfig) -> PoolResult<Pool> {
        config.validate()?;
        let queue = FifoQueue::new(config.queue_length).map_err(|e| match e {
            QueueError::InvalidArgument => PoolError::InvalidSize,
            QueueError::Resource => PoolError::SemRange,
            other => PoolError::Queue(other),
        })?;
        Self::start(config, QueueHandle::Builtin(queue))
    }

    /// Create a pool using the built-in FIFO queue.
    ///
    /// The built-in queue is compiled out; supply one via `with_queue`.
    #[cfg(not(feature = "fifo-queue"))]
    pub fn new(config: PoolConfig) -> PoolResult<Pool> {
        config.validate()?;
        Err(PoolError::QueueOpsNone)
    }

    /// Create a pool dispatching through a caller-supplied queue.
    pub fn with_queue(config: PoolConfig, queue: Box<dyn JobQueue>) -> PoolResult<Pool> {
        config.validate()?;
        Self::start(config, QueueHandle::Custom(queue))
    }

    fn start(config: PoolConfig, queue: QueueHandle) -> PoolResult<Pool> {
        kprint::init();

        let shared = Arc::new(PoolShared {
            registry: Registry::new(),
            job_ids: JobIdCounter::new(),
            queue,
            threads_total: AtomicUsize::new(0),
            threads_working: AtomicUsize::new(0),
            kill_quota: AtomicI64::new(0),
            quiesce: new_semaphore(0),
            flags: PoolFlags::new(),
            shut_down: AtomicBool::new(false),
            worker_seq: AtomicUsize::new(0),
        });

        spawn_workers(&shared, config.threads_number)?;
        Ok(Pool { shared })
    }

    /// Submit a job. Returns the id stamped on it.
    ///
    /// With `QueueFlags::BLOCK` the call waits for queue space; with
    /// `NO_BLOCK` a full queue reports
    /// `PoolError::Queue(QueueError::WouldBlock)` and leaves the queue
    /// untouched.
    pub fn push<F>(&self, f: F, flags: QueueFlags) -> PoolResult<JobId>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.shared.shut_down.load(Ordering::SeqCst) {
            return Err(PoolError::Uninitialized);
        }

        let mut job = Job::new(f);
        let id = self.shared.job_ids.next();
        job.set_id(id);

        match self.shared.queue().push(job, flags) {
            Ok(()) => Ok(id),
            // A blocking push retries interruption internally; a queue
            // surfacing it is breaking the contract.
            Err(QueueError::Interrupted) => Err(PoolError::PushFailed),
            Err(e) => Err(PoolError::Queue(e)),
        }
    }

    /// Block until no worker is executing a job and the queue is empty.
    ///
    /// If the pool is already quiescent this returns without blocking:
    /// parking would deadlock, since no worker would ever post the
    /// semaphore. Concurrent `wait` calls are not supported.
    pub fn wait(&self) {
        // Absorb stale posts left over from a previous wait
        while self.shared.quiesce.try_acquire() {}

        self.shared.flags.set(FLAG_WAIT);

        let working = self.shared.threads_working.load(Ordering::SeqCst);
        let pending = self.shared.queue().len().unwrap_or(0);
        if working > 0 || pending > 0 {
            while self.shared.quiesce.acquire().is_err() {}
        }

        self.shared.flags.clear(FLAG_WAIT);
    }

    /// Number of jobs currently waiting in the queue.
    ///
    /// Advisory. Fails with `QueueOpsNone` when the queue does not report
    /// a length.
    pub fn jobs_pending(&self) -> PoolResult<usize> {
        self.shared.queue().len().ok_or(PoolError::QueueOpsNone)
    }

    /// Number of live worker threads
    pub fn threads_total(&self) -> usize {
        self.shared.threads_total.load(Ordering::Relaxed)
    }

    /// Number of workers currently executing a job
    pub fn threads_working(&self) -> usize {
        self.shared.threads_working.load(Ordering::Relaxed)
    }

    /// Raw pool flag word. Diagnostic only.
    pub fn pool_flags(&self) -> u32 {
        self.shared.flags.snapshot()
    }

    /// Start `n` additional workers.
    ///
    /// On spawn failure the already-started part of the batch is rolled
    /// back and the pool is left as it was.
    pub fn add_threads(&self, n: usize) -> PoolResult<()> {
        if n == 0 {
            return Err(PoolError::InvalidSize);
        }
        if self.shared.shut_down.load(Ordering::SeqCst) {
            return Err(PoolError::Uninitialized);
        }
        spawn_workers(&self.shared, n)
    }

    /// Ask `n` workers to retire.
    ///
    /// Asynchronous: the call returns once the wake job is posted; each
    /// retirement happens when a worker next observes the flags. Workers
    /// mid-job finish their current job first. If `n` exceeds the live
    /// worker count, future workers keep retiring until the quota drains.
    pub fn remove_threads(&self, n: usize) -> PoolResult<()> {
        if n == 0 {
            return Err(PoolError::InvalidSize);
        }
        if self.shared.shut_down.load(Ordering::SeqCst) {
            return Err(PoolError::Uninitialized);
        }

        self.shared.kill_quota.fetch_add(n as i64, Ordering::SeqCst);
        self.shared.flags.set(FLAG_KILL_N);

        match self.shared.queue().push(Job::wake(), QueueFlags::BLOCK) {
            Ok(()) => Ok(()),
            Err(QueueError::Interrupted) => Err(PoolError::PushFailed),
            // KILL_N stays set; the quota is consumed at the next
            // burst-drain exit points even without the wake.
            Err(e) => Err(PoolError::Queue(e)),
        }
    }

    /// Retire every worker and release the pool's resources.
    ///
    /// Also runs on drop. Queued jobs that no worker picked up before the
    /// retirement flag reached it are dropped unexecuted; call `wait()`
    /// first to drain.
    pub fn shutdown(&mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&self) {
        if self.shared.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        ktrace!("pool shutting down");

        let total = self.shared.threads_total.load(Ordering::SeqCst);
        if total > 0 {
            self.shared
                .kill_quota
                .fetch_add(total as i64, Ordering::SeqCst);
            self.shared.flags.set(FLAG_KILL_N);
            // Best effort: a full queue means no worker is parked in pop,
            // so everyone reaches a flag check on their own.
            let _ = self.shared.queue().push(Job::wake(), QueueFlags::NO_BLOCK);
        }

        for mut entry in self.shared.registry.drain() {
            if let Some(join) = entry.join.take() {
                let _ = join.join();
            }
        }
        self.shared.threads_total.store(0, Ordering::SeqCst);
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

/// Start `n` workers and splice them into the registry as one batch.
///
/// The registry lock is held across the whole batch so no new worker can
/// retire before its entry exists. On a spawn failure the started part of
/// the batch is unwound through per-worker rollback flags; the registry
/// and the totals never see the failed batch.
fn spawn_workers(shared: &Arc<PoolShared>, n: usize) -> PoolResult<()> {
    let mut entries = shared.registry.lock();
    let mut batch: Vec<WorkerEntry> = Vec::with_capacity(n);

    for _ in 0..n {
        let handle = Arc::new(WorkerHandle::new());
        let worker_id = shared.worker_seq.fetch_add(1, Ordering::Relaxed);
        let args = WorkerArgs {
            shared: Arc::clone(shared),
            handle: Arc::clone(&handle),
            worker_id,
        };

        let spawned = thread::Builder::new()
            .name(format!("jobpool-worker-{}", worker_id))
            .spawn(move || worker_loop(args));

        match spawned {
            Ok(join) => batch.push(WorkerEntry {
                handle,
                join: Some(join),
            }),
            Err(e) => {
                for entry in &batch {
                    entry.handle.request_rollback();
                }
                drop(entries);
                unwind_batch(shared, batch);
                return Err(map_spawn_error(e));
            }
        }
    }

    entries.extend(batch);
    drop(entries);
    shared.threads_total.fetch_add(n, Ordering::SeqCst);
    Ok(())
}

/// Wake each rolled-back worker until it observes its flag and exits.
fn unwind_batch(shared: &Arc<PoolShared>, batch: Vec<WorkerEntry>) {
    for mut entry in batch {
        if let Some(join) = entry.join.take() {
            while !join.is_finished() {
                let _ = shared.queue().push(Job::wake(), QueueFlags::NO_BLOCK);
                thread::yield_now();
            }
            let _ = join.join();
        }
    }
}

fn map_spawn_error(e: std::io::Error) -> PoolError {
    use std::io::ErrorKind;
    match e.kind() {
        ErrorKind::PermissionDenied => PoolError::PermissionDenied,
        ErrorKind::OutOfMemory | ErrorKind::WouldBlock => PoolError::NoResource,
        _ => PoolError::SpawnFailed,
    }
}
