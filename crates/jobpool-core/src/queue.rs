//! Job queue abstraction
//!
//! The pool talks to its queue through [`JobQueue`], a narrow contract any
//! bounded MPMC container can satisfy. Construction takes the place of the
//! C-style `init` operation and `Drop` takes the place of `free`; `len` and
//! `capacity` are optional and advisory.

use crate::job::Job;
use core::fmt;

/// Flags steering push/pop behavior at the full/empty boundary.
///
/// `BLOCK` and `NO_BLOCK` are distinct bit patterns; implementations test
/// the `BLOCK` bit specifically and treat everything else as non-blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct QueueFlags(u32);

impl QueueFlags {
    /// Wait indefinitely when the queue is full (push) or empty (pop)
    pub const BLOCK: QueueFlags = QueueFlags(1 << 31);

    /// Fail with [`QueueError::WouldBlock`] instead of waiting
    pub const NO_BLOCK: QueueFlags = QueueFlags(1 << 30);

    /// Raw bit pattern
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when the BLOCK bit is set
    #[inline]
    pub const fn is_blocking(self) -> bool {
        self.0 & Self::BLOCK.0 != 0
    }
}

/// Errors a queue operation can report.
///
/// The four kinds partition every failure mode the pool distinguishes;
/// custom implementations map their internals onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// NO_BLOCK push on a full queue, or NO_BLOCK pop on an empty one
    WouldBlock,

    /// A blocking wait was interrupted by a signal.
    ///
    /// Push paths retry this internally; pop paths surface it so the
    /// worker loop can inspect pool flags before re-entering the wait.
    Interrupted,

    /// The operation's arguments violate the queue's contract
    InvalidArgument,

    /// The queue could not obtain an operating-system resource
    Resource,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::WouldBlock => write!(f, "operation would block"),
            QueueError::Interrupted => write!(f, "wait interrupted by signal"),
            QueueError::InvalidArgument => write!(f, "invalid queue argument"),
            QueueError::Resource => write!(f, "queue resource exhausted"),
        }
    }
}

impl std::error::Error for QueueError {}

/// Contract between the pool and any queue implementation.
///
/// Implementations must be internally synchronized: pushes and pops arrive
/// concurrently from producers and workers. FIFO ordering is what the
/// built-in queue provides, but the pool's correctness does not depend on
/// it; a custom queue may dispatch in any order.
pub trait JobQueue: Send + Sync {
    /// Enqueue a job by value.
    ///
    /// With `BLOCK`, waits for a free slot and retries interrupted waits
    /// silently. Otherwise returns [`QueueError::WouldBlock`] when full.
    fn push(&self, job: Job, flags: QueueFlags) -> Result<(), QueueError>;

    /// Dequeue a job by value.
    ///
    /// With `BLOCK`, waits for an entry but surfaces
    /// [`QueueError::Interrupted`] instead of retrying, so the caller can
    /// observe pool flags. Otherwise returns [`QueueError::WouldBlock`]
    /// when empty.
    fn pop(&self, flags: QueueFlags) -> Result<Job, QueueError>;

    /// Instantaneous element count, if the implementation tracks one.
    ///
    /// Advisory: the value may be stale by the time the caller reads it.
    fn len(&self) -> Option<usize> {
        None
    }

    /// Fixed capacity, if the implementation has one
    fn capacity(&self) -> Option<usize> {
        None
    }
}
