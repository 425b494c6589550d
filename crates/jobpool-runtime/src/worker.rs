//! Worker loop
//!
//! Each worker cycles through: blocking pop (idle) → run the job → drain
//! further jobs without blocking → sample pool flags → back to idle or
//! exit. The wake job short-circuits execution and jumps straight to the
//! flag check; an interrupted pop does the same, since a signal may have
//! been delivered for coordination.

use crate::pool::PoolShared;
use crate::registry::WorkerHandle;
use jobpool_core::flags::{FLAG_KILL_N, FLAG_WAIT};
use jobpool_core::job::Job;
use jobpool_core::kprint;
use jobpool_core::queue::{QueueError, QueueFlags};
use jobpool_core::{kdebug, kerror, ktrace};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

/// Everything a worker thread needs, moved into its closure at spawn
pub(crate) struct WorkerArgs {
    pub shared: Arc<PoolShared>,
    pub handle: Arc<WorkerHandle>,
    pub worker_id: usize,
}

#[derive(PartialEq, Eq)]
enum FlagOutcome {
    /// Nothing owed; return to idle
    Continue,
    /// This worker retires: unlink, decrement totals, terminate
    Exit,
    /// Spawn rollback: terminate without touching pool accounting
    ExitRollback,
}

pub(crate) fn worker_loop(args: WorkerArgs) {
    let WorkerArgs {
        shared,
        handle: me,
        worker_id,
    } = args;

    kprint::set_worker_id(worker_id);
    ktrace!("worker started");

    loop {
        let job = match shared.queue().pop(QueueFlags::BLOCK) {
            Ok(job) => job,
            Err(QueueError::Interrupted) => match handle_flags(&shared, &me) {
                FlagOutcome::Continue => continue,
                FlagOutcome::Exit => break,
                FlagOutcome::ExitRollback => return,
            },
            Err(_) => {
                // A misbehaving queue; back off instead of spinning hard.
                thread::yield_now();
                continue;
            }
        };

        if !job.is_wake() {
            run_burst(&shared, &me, job);
        }

        match handle_flags(&shared, &me) {
            FlagOutcome::Continue => {}
            FlagOutcome::Exit => break,
            FlagOutcome::ExitRollback => return,
        }
    }

    retire(&shared, &me);
    kprint::clear_worker_id();
}

/// Run the popped job, then keep draining without blocking until the
/// queue is dry or a retirement is owed.
fn run_burst(shared: &PoolShared, me: &WorkerHandle, first: Job) {
    me.set_current_job(first.id());
    kprint::set_job_id(first.id().as_i64());
    shared.threads_working.fetch_add(1, Ordering::SeqCst);

    run_job(first);

    loop {
        // A pending kill beats further draining; another worker (or this
        // one, next time around) will pick the queue back up.
        if shared.flags.contains(FLAG_KILL_N) {
            break;
        }
        match shared.queue().pop(QueueFlags::NO_BLOCK) {
            Ok(job) if !job.is_wake() => {
                me.set_current_job(job.id());
                kprint::set_job_id(job.id().as_i64());
                run_job(job);
            }
            // Consumed a wake; the flag check below handles it
            Ok(_) => break,
            Err(_) => break,
        }
    }

    shared.threads_working.fetch_sub(1, Ordering::SeqCst);
    me.set_idle();
    kprint::clear_job_id();
}

/// Execute a job, containing any panic to the job itself.
///
/// Letting a panic unwind through the loop would strand the working
/// count and wedge every later `wait()`.
fn run_job(job: Job) {
    let id = job.id();
    if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| job.run())).is_err() {
        kerror!("job {} panicked", id);
    }
}

/// Sample the pool flags and decide this worker's fate.
fn handle_flags(shared: &PoolShared, me: &WorkerHandle) -> FlagOutcome {
    if me.rollback_requested() {
        // This worker belongs to a spawn batch that failed. It may have
        // swallowed a wake meant for the kill quota; repost it.
        if shared.flags.contains(FLAG_KILL_N) && shared.kill_quota.load(Ordering::SeqCst) > 0 {
            let _ = shared.queue().push(Job::wake(), QueueFlags::NO_BLOCK);
        }
        kdebug!("worker rolled back");
        return FlagOutcome::ExitRollback;
    }

    let flags = shared.flags.snapshot();

    if flags & FLAG_KILL_N != 0 {
        let remaining = shared.kill_quota.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining > 0 {
            // More retirements owed: relay the wake to the next blocked
            // worker. Non-blocking: a full queue means nobody is parked
            // in pop, so every survivor reaches its own flag check.
            let _ = shared.queue().push(Job::wake(), QueueFlags::NO_BLOCK);
        } else {
            shared.flags.clear(FLAG_KILL_N);
        }
        return FlagOutcome::Exit;
    }

    if flags & FLAG_WAIT != 0 && shared.threads_working.load(Ordering::SeqCst) == 0 {
        // Last one out signals quiescence.
        shared.quiesce.post();
    }

    FlagOutcome::Continue
}

/// Unlink this worker's registry entry and drop out of the totals.
///
/// The entry owns our join handle; dropping it detaches the thread.
/// `None` means the entry was never spliced (the spawning call failed
/// after we started), in which case we were never counted either.
fn retire(shared: &PoolShared, me: &Arc<WorkerHandle>) {
    if shared.registry.remove(me).is_some() {
        shared.threads_total.fetch_sub(1, Ordering::SeqCst);
    }
    kdebug!("worker retired");
}
