//! Pool configuration
//!
//! Compile-time defaults with runtime environment overrides, applied in
//! priority order: builder methods beat environment variables beat the
//! library defaults.

use jobpool_core::error::{PoolError, PoolResult};
use std::str::FromStr;

/// Library defaults
pub mod defaults {
    /// Worker threads when `JP_THREADS` is unset
    pub const THREADS: usize = 4;

    /// Queue capacity when `JP_QUEUE_LENGTH` is unset
    pub const QUEUE_LENGTH: usize = 256;
}

/// Parse the variable as `T`; unset or unparseable falls back to the
/// default.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Pool construction parameters.
///
/// Use `from_env()` to start from defaults with environment overrides,
/// then chain builder methods:
///
/// ```ignore
/// let config = PoolConfig::from_env().threads_number(8).queue_length(1024);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads to start; must be at least 1
    pub threads_number: usize,

    /// Capacity passed to the queue; must be at least 1
    pub queue_length: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl PoolConfig {
    /// Create a config from defaults with environment overrides.
    ///
    /// Environment variables (both optional):
    /// - `JP_THREADS` - number of worker threads
    /// - `JP_QUEUE_LENGTH` - job queue capacity
    pub fn from_env() -> Self {
        Self {
            threads_number: env_parse("JP_THREADS", defaults::THREADS),
            queue_length: env_parse("JP_QUEUE_LENGTH", defaults::QUEUE_LENGTH),
        }
    }

    /// Create a config with explicit values
    pub fn new(threads_number: usize, queue_length: usize) -> Self {
        Self {
            threads_number,
            queue_length,
        }
    }

    /// Set the worker thread count
    pub fn threads_number(mut self, n: usize) -> Self {
        self.threads_number = n;
        self
    }

    /// Set the queue capacity
    pub fn queue_length(mut self, n: usize) -> Self {
        self.queue_length = n;
        self
    }

    /// Check the size constraints
    pub fn validate(&self) -> PoolResult<()> {
        if self.threads_number == 0 || self.queue_length == 0 {
            return Err(PoolError::InvalidSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = PoolConfig::new(1, 1).threads_number(3).queue_length(64);
        assert_eq!(config.threads_number, 3);
        assert_eq!(config.queue_length, 64);
    }

    #[test]
    fn test_validate_rejects_zero_threads() {
        let config = PoolConfig::new(0, 10);
        assert_eq!(config.validate().unwrap_err(), PoolError::InvalidSize);
    }

    #[test]
    fn test_validate_rejects_zero_queue() {
        let config = PoolConfig::new(2, 0);
        assert_eq!(config.validate().unwrap_err(), PoolError::InvalidSize);
    }

    #[test]
    fn test_validate_accepts_minimum() {
        assert!(PoolConfig::new(1, 1).validate().is_ok());
    }

    #[test]
    fn test_env_parse_unset_uses_default() {
        let v: usize = env_parse("JP_TEST_UNSET_VARIABLE", 7);
        assert_eq!(v, 7);
    }
}
