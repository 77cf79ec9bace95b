//! # tickpool
//!
//! A self-scaling worker pool that executes many short-lived, cancelable
//! jobs on background threads while funneling every lifecycle notification
//! back onto the thread that created the pool, once per tick.
//!
//! ## Features
//!
//! - **Demand-driven scaling**: worker threads are spawned as the queue
//!   grows and retired as it drains, between configurable `min`/`max` bounds
//! - **Deterministic dispatch**: "started", "progress", "completed",
//!   "failed" and "all work finished" notifications fire only on the main
//!   thread, from inside [`ThreadPool::tick`]
//! - **Lock-free hand-off**: workers and controller exchange immutable job
//!   records over two crossbeam channels; pool state is confined to the
//!   main thread and never shared
//! - **Cooperative fallback**: on targets without native threads (or on
//!   request) the pool time-slices jobs on the main thread, spending at most
//!   a configured fraction of the frame budget per tick
//! - **Cooperative cancellation**: [`ThreadPool::cancel`] clears pending
//!   work and retires every worker; in-flight jobs are never interrupted
//!
//! ## Quick Start
//!
//! ```rust
//! use tickpool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! // One work function is shared by every job; payloads distinguish them.
//! let mut pool = ThreadPool::new(0, 2, |n: &u64, ctx: &mut JobContext<u64>| {
//!     let _ = n * n; // one bounded iteration of work
//!     ctx.complete();
//!     Ok(())
//! })?;
//!
//! pool.on_completed(|job| println!("job {} done", job.id()));
//!
//! pool.queue(3)?;
//! pool.queue(4)?;
//!
//! // Drive the pool from the main loop. Once fully idle it deregisters
//! // itself and ticks become no-ops until the next queue() call.
//! while pool.is_active() {
//!     pool.tick()?;
//!     std::thread::sleep(std::time::Duration::from_millis(1));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Long-running jobs
//!
//! A job's work function is invoked repeatedly until it sets the completion
//! flag, so long work should be split into bounded iterations:
//!
//! ```rust
//! use tickpool::prelude::*;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! # fn main() -> Result<()> {
//! let mut pool = ThreadPool::new(0, 1, |counter: &AtomicU64, ctx| {
//!     let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
//!     if done % 100 == 0 {
//!         ctx.progress(AtomicU64::new(done));
//!     }
//!     if done >= 1000 {
//!         ctx.complete();
//!     }
//!     Ok(())
//! })?;
//! pool.queue(AtomicU64::new(0))?;
//! # pool.cancel()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Single-threaded mode
//!
//! ```rust
//! use tickpool::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let config = PoolConfig::new(0, 1)
//!     .with_mode(ThreadMode::SingleThreaded)
//!     .with_time_slice(0.25)
//!     .with_frame_budget(Duration::from_millis(16));
//!
//! let mut pool = ThreadPool::with_config(config)?;
//! pool.set_work(|n: &u32, ctx: &mut JobContext<u32>| {
//!     if ctx.iterations() >= 2 {
//!         ctx.complete();
//!     }
//!     Ok(())
//! });
//!
//! pool.queue(1)?;
//! while pool.is_active() {
//!     pool.tick()?; // at most a quarter of the 16ms budget per tick
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod pool;
pub mod prelude;

mod queue;

pub use crate::core::{
    CancellationToken, Clock, JobContext, JobData, JobId, PoolError, Result, SystemClock, WorkFn,
};
pub use crate::pool::{PoolConfig, ThreadMode, ThreadPool};
