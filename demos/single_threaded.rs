//! Cooperative single-threaded mode example
//!
//! Demonstrates time-sliced job execution on the main thread: the pool spends
//! at most `time_slice × frame_budget` per tick, spreading long jobs across
//! frames.
//!
//! Run with: cargo run --example single_threaded

use std::time::Duration;
use tickpool::prelude::*;

fn main() -> Result<()> {
    println!("=== tickpool - Single-Threaded Mode Example ===\n");

    // A quarter of a 16ms frame per tick
    let config = PoolConfig::new(0, 1)
        .with_mode(ThreadMode::SingleThreaded)
        .with_time_slice(0.25)
        .with_frame_budget(Duration::from_millis(16));

    let mut pool = ThreadPool::with_config(config)?;
    pool.set_work(|steps: &u64, ctx: &mut JobContext<u64>| {
        // One bounded iteration of work per invocation
        std::thread::sleep(Duration::from_millis(1));
        ctx.progress(ctx.iterations());
        if ctx.iterations() + 1 >= *steps {
            ctx.complete();
        }
        Ok(())
    });

    pool.on_started(|job| println!("   started   {}", job.id()));
    pool.on_progress(|_, step| println!("     ...step {}", step));
    pool.on_completed(|job| println!("   completed {}", job.id()));
    pool.on_finished(|| println!("   all work finished"));

    println!("1. Queueing two jobs (20 and 5 iterations):");
    pool.queue(20)?;
    pool.queue(5)?;

    println!("\n2. Ticking; each tick runs at most ~4ms of work:");
    let mut ticks = 0u32;
    while pool.is_active() {
        pool.tick()?;
        ticks += 1;
    }

    println!("\n3. Both jobs done after {} ticks", ticks);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
