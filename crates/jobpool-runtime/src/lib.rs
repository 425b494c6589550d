//! # jobpool-runtime
//!
//! Platform-specific runtime for the jobpool worker pool.
//!
//! This crate provides:
//! - Counting semaphores (futex on Linux, condvar fallback elsewhere)
//! - The built-in bounded FIFO queue (`fifo-queue` feature)
//! - Worker thread management and the worker loop
//! - The pool core and its configuration

pub mod config;
pub mod pool;
pub mod sem;

#[cfg(feature = "fifo-queue")]
pub mod fifo;

mod registry;
mod worker;

// Re-exports
pub use config::PoolConfig;
pub use pool::Pool;
pub use registry::WorkerHandle;
pub use sem::{new_semaphore, PlatformSemaphore, Semaphore, WaitInterrupted, SEM_VALUE_MAX};

#[cfg(feature = "fifo-queue")]
pub use fifo::FifoQueue;
