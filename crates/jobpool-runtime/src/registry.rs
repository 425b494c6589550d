//! Worker registry
//!
//! The pool tracks live workers through shared handles. Each entry pairs
//! the worker's [`WorkerHandle`] with its join handle; the vector behind
//! the pool mutex is the single source of truth for membership. A worker
//! unlinks its own entry when it retires, dropping its join handle and
//! thereby detaching itself.

use jobpool_core::id::JobId;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

/// Shared per-worker state.
///
/// Lives in an `Arc` held by the registry and by the worker itself, so the
/// descriptor outlives whichever side finishes first.
pub struct WorkerHandle {
    /// Id of the job this worker is executing, `JobId::NONE` when idle
    current_job: AtomicI64,

    /// Set when a partially failed spawn batch must unwind; the worker
    /// exits without touching pool accounting
    rollback: AtomicBool,
}

impl WorkerHandle {
    pub(crate) fn new() -> Self {
        Self {
            current_job: AtomicI64::new(JobId::NONE.as_i64()),
            rollback: AtomicBool::new(false),
        }
    }

    /// Id of the currently executing job, `JobId::NONE` when idle
    #[inline]
    pub fn current_job(&self) -> JobId {
        JobId::new(self.current_job.load(Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn set_current_job(&self, id: JobId) {
        self.current_job.store(id.as_i64(), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn set_idle(&self) {
        self.current_job
            .store(JobId::NONE.as_i64(), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn request_rollback(&self) {
        self.rollback.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub(crate) fn rollback_requested(&self) -> bool {
        self.rollback.load(Ordering::SeqCst)
    }
}

/// A registry entry: worker state plus its join handle
pub(crate) struct WorkerEntry {
    pub handle: Arc<WorkerHandle>,
    pub join: Option<JoinHandle<()>>,
}

/// Registry of live workers, mutated only under its mutex
pub(crate) struct Registry {
    entries: Mutex<Vec<WorkerEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Lock the entry list directly.
    ///
    /// Spawn batches hold this across thread creation so no new worker can
    /// retire before its entry is spliced in.
    pub fn lock(&self) -> MutexGuard<'_, Vec<WorkerEntry>> {
        self.entries.lock().unwrap()
    }

    /// Unlink the entry for `handle` by identity.
    ///
    /// Returns the removed entry, or `None` when the worker was never
    /// registered (a rolled-back spawn).
    pub fn remove(&self, handle: &Arc<WorkerHandle>) -> Option<WorkerEntry> {
        let mut entries = self.lock();
        let idx = entries
            .iter()
            .position(|e| Arc::ptr_eq(&e.handle, handle))?;
        Some(entries.swap_remove(idx))
    }

    /// Take every entry, leaving the registry empty
    pub fn drain(&self) -> Vec<WorkerEntry> {
        let mut entries = self.lock();
        std::mem::take(&mut *entries)
    }
}
