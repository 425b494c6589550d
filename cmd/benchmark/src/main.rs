//! Throughput benchmark
//!
//! Measures push+dispatch rate for empty jobs across worker counts.

use jobpool::{Pool, PoolConfig, QueueFlags};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

const JOBS_PER_RUN: usize = 200_000;

fn run_once(workers: usize, queue_length: usize) -> f64 {
    let pool = Pool::new(PoolConfig::new(workers, queue_length)).expect("failed to start pool");
    let completed = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    for _ in 0..JOBS_PER_RUN {
        let completed = Arc::clone(&completed);
        pool.push(
            move || {
                completed.fetch_add(1, Ordering::Relaxed);
            },
            QueueFlags::BLOCK,
        )
        .expect("push failed");
    }
    pool.wait();
    let elapsed = start.elapsed();

    assert_eq!(completed.load(Ordering::Relaxed), JOBS_PER_RUN);
    JOBS_PER_RUN as f64 / elapsed.as_secs_f64()
}

fn main() {
    println!("=== jobpool Benchmark ===");
    println!("{} empty jobs per run\n", JOBS_PER_RUN);

    for workers in [1, 2, 4, 8] {
        for queue_length in [64, 1024] {
            let rate = run_once(workers, queue_length);
            println!(
                "workers={:<2} qlen={:<5} {:>12.0} jobs/sec",
                workers, queue_length, rate
            );
        }
    }
}
