//! Stress test - many small jobs through a small queue
//!
//! Exercises producer backpressure and worker add/remove while two
//! producer threads hammer the pool.

use jobpool::{Pool, PoolConfig, QueueFlags};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("=== jobpool Stress Test ===\n");

    let num_jobs: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(100_000);

    let pool = Arc::new(
        Pool::new(PoolConfig::from_env().threads_number(4).queue_length(128))
            .expect("failed to start pool"),
    );
    let completed = Arc::new(AtomicUsize::new(0));

    println!("Pushing {} jobs from 2 producers...", num_jobs);
    let start = Instant::now();

    let mut producers = vec![];
    for p in 0..2 {
        let pool = Arc::clone(&pool);
        let completed = Arc::clone(&completed);
        producers.push(thread::spawn(move || {
            for i in 0..num_jobs / 2 {
                let completed = Arc::clone(&completed);
                pool.push(
                    move || {
                        completed.fetch_add(1, Ordering::Relaxed);
                    },
                    QueueFlags::BLOCK,
                )
                .expect("push failed");

                // Shrink and regrow the pool mid-stream
                if p == 0 && i == num_jobs / 8 {
                    pool.remove_threads(2).expect("remove failed");
                }
                if p == 0 && i == num_jobs / 4 {
                    pool.add_threads(2).expect("add failed");
                }
            }
        }));
    }
    for h in producers {
        h.join().unwrap();
    }

    let push_time = start.elapsed();
    pool.wait();
    let total_time = start.elapsed();

    let done = completed.load(Ordering::Relaxed);
    println!("\n=== Results ===");
    println!("Jobs completed:  {}/{}", done, num_jobs / 2 * 2);
    println!("Workers at end:  {}", pool.threads_total());
    println!("Push time:       {:?}", push_time);
    println!("Total time:      {:?}", total_time);
    println!(
        "Throughput:      {:.0} jobs/sec",
        done as f64 / total_time.as_secs_f64()
    );
}
