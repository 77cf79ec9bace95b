//! Basic worker pool usage example
//!
//! Demonstrates pool creation, job queueing, tick-driven notifications and
//! demand-driven scaling.
//!
//! Run with: cargo run --example basic_usage

use std::thread;
use std::time::Duration;
use tickpool::prelude::*;

fn main() -> Result<()> {
    println!("=== tickpool - Basic Usage Example ===\n");

    // Between 0 and 4 threads; one shared work function, payloads differ
    let mut pool = ThreadPool::new(0, 4, |n: &u64, ctx: &mut JobContext<u64>| {
        thread::sleep(Duration::from_millis(10 * n));
        if *n == 7 {
            return Err(PoolError::job("payload 7 is rejected"));
        }
        ctx.complete();
        Ok(())
    })?;

    println!("1. Wiring notifications (all fire on this thread):");
    pool.on_started(|job| println!("   started   {}", job.id()));
    pool.on_completed(|job| println!("   completed {}", job.id()));
    pool.on_failed(|job, err| println!("   failed    {}: {}", job.id(), err));
    pool.on_finished(|| println!("   all work finished"));

    println!("\n2. Queueing 10 jobs:");
    for n in 0..10u64 {
        pool.queue(n)?;
    }
    println!("   pool registered: {}", pool.is_active());

    println!("\n3. Ticking from the main loop:");
    while pool.is_active() {
        pool.tick()?;
        println!(
            "   live: {}, active: {}, idle: {}",
            pool.live_threads(),
            pool.active_threads(),
            pool.idle_threads()
        );
        thread::sleep(Duration::from_millis(10));
    }

    println!("\n4. Fully idle: pool deregistered itself, ticks are no-ops");
    println!("   live threads: {}", pool.live_threads());

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
