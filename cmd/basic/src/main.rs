//! Basic jobpool example
//!
//! Pushes a batch of counted jobs and waits for quiescence.

use jobpool::{Pool, PoolConfig, QueueFlags};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn main() {
    println!("=== jobpool Basic Example ===\n");

    let config = PoolConfig::from_env().threads_number(4).queue_length(64);
    println!(
        "Starting pool: {} workers, queue length {}",
        config.threads_number, config.queue_length
    );

    let pool = Pool::new(config).expect("failed to start pool");
    let completed = Arc::new(AtomicUsize::new(0));
    let total_jobs = 100;

    println!("Pushing {} jobs...\n", total_jobs);
    for i in 0..total_jobs {
        let completed = Arc::clone(&completed);
        let id = pool
            .push(
                move || {
                    completed.fetch_add(1, Ordering::Relaxed);
                },
                QueueFlags::BLOCK,
            )
            .expect("push failed");
        if i < 3 {
            println!("Pushed job {}", id);
        }
    }

    println!("...\nWaiting for quiescence...");
    pool.wait();

    println!(
        "\n{}/{} jobs completed, {} workers idle",
        completed.load(Ordering::Relaxed),
        total_jobs,
        pool.threads_total()
    );
    println!("\n=== Example Complete ===");
}
