//! # jobpool - fixed-capacity worker pool
//!
//! A worker pool over a bounded, pluggable job queue with precise
//! lifecycle control.
//!
//! ## Features
//!
//! - **Bounded queue**: fixed-capacity FIFO with blocking and
//!   non-blocking push/pop, multi-producer / multi-consumer safe
//! - **Pluggable**: swap the queue for any [`JobQueue`] implementation
//! - **Elastic workers**: add workers at runtime, retire any number
//!   asynchronously without interrupting running jobs
//! - **Quiescence**: `wait()` blocks until every job has finished and the
//!   queue is empty
//! - **Monotonic job ids**: every push returns a unique id with a defined
//!   wrap-around policy
//!
//! ## Quick Start
//!
//! ```ignore
//! use jobpool::{Pool, PoolConfig, QueueFlags};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! fn main() {
//!     let pool = Pool::new(PoolConfig::new(4, 256)).unwrap();
//!     let done = Arc::new(AtomicUsize::new(0));
//!
//!     for _ in 0..1000 {
//!         let done = Arc::clone(&done);
//!         pool.push(
//!             move || {
//!                 done.fetch_add(1, Ordering::Relaxed);
//!             },
//!             QueueFlags::BLOCK,
//!         )
//!         .unwrap();
//!     }
//!
//!     pool.wait();
//!     assert_eq!(done.load(Ordering::Relaxed), 1000);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Producers                        │
//! │              push(job) -> JobId                     │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                 Bounded job queue                   │
//! │     slots_free / slots_used counting semaphores     │
//! └─────────────────────────────────────────────────────┘
//!           │              │              │
//!           ▼              ▼              ▼
//!     ┌──────────┐   ┌──────────┐   ┌──────────┐
//!     │  Worker  │   │  Worker  │   │  Worker  │
//!     │  thread  │   │  thread  │   │  thread  │
//!     └──────────┘   └──────────┘   └──────────┘
//!           │              │              │
//!           └──────────────┼──────────────┘
//!                          ▼
//!         pool flags · kill quota · quiescence
//! ```

// Re-export core types
pub use jobpool_core::{
    Job, JobFn, JobId, JobIdCounter, JobQueue, PoolError, PoolResult, QueueError, QueueFlags,
};

// Re-export kprint macros for debug logging
pub use jobpool_core::kprint::{init as init_logging, set_log_level, LogLevel};
pub use jobpool_core::{kdebug, kerror, kinfo, ktrace, kwarn};

// Re-export runtime types
pub use jobpool_runtime::{
    new_semaphore, Pool, PoolConfig, Semaphore, WaitInterrupted, SEM_VALUE_MAX,
};

#[cfg(feature = "fifo-queue")]
pub use jobpool_runtime::FifoQueue;
