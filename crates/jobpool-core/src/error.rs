//! Error types for pool operations

use crate::queue::QueueError;
use core::fmt;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur in pool operations.
///
/// This is a closed enumeration: every public operation documents the
/// subset it can return. Queue-originated failures pass through unchanged
/// inside [`PoolError::Queue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// A size argument (thread count, queue length, add/remove count)
    /// was not at least 1
    InvalidSize,

    /// No queue implementation available: the built-in FIFO is compiled
    /// out and none was supplied, or the supplied queue lacks the
    /// operation (e.g. `len` for `jobs_pending`)
    QueueOpsNone,

    /// The operating system ran out of a non-memory resource while
    /// creating a thread or synchronization primitive
    NoResource,

    /// Insufficient permissions to create a thread with the requested
    /// attributes
    PermissionDenied,

    /// The requested queue length exceeds the semaphore's counting range
    SemRange,

    /// The queue push failed in a way that cannot be expressed as a
    /// [`QueueError`]
    PushFailed,

    /// The pool has been shut down (or was never fully initialized)
    Uninitialized,

    /// Worker thread creation failed
    SpawnFailed,

    /// Error reported by the queue implementation, passed through
    Queue(QueueError),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidSize => write!(f, "size argument must be at least 1"),
            PoolError::QueueOpsNone => write!(f, "no queue operation available"),
            PoolError::NoResource => write!(f, "insufficient system resources"),
            PoolError::PermissionDenied => write!(f, "insufficient permissions"),
            PoolError::SemRange => write!(f, "queue length exceeds semaphore range"),
            PoolError::PushFailed => write!(f, "queue refused the job"),
            PoolError::Uninitialized => write!(f, "pool is not initialized"),
            PoolError::SpawnFailed => write!(f, "failed to spawn worker thread"),
            PoolError::Queue(e) => write!(f, "queue error: {}", e),
        }
    }
}

impl std::error::Error for PoolError {}

impl From<QueueError> for PoolError {
    fn from(e: QueueError) -> Self {
        PoolError::Queue(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = PoolError::InvalidSize;
        assert_eq!(format!("{}", e), "size argument must be at least 1");

        let e = PoolError::Queue(QueueError::WouldBlock);
        assert_eq!(format!("{}", e), "queue error: operation would block");
    }

    #[test]
    fn test_error_conversion() {
        let qe = QueueError::Interrupted;
        let pe: PoolError = qe.into();
        assert!(matches!(pe, PoolError::Queue(QueueError::Interrupted)));
    }
}
