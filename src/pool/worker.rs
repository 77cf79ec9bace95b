//! Background worker loop.
//!
//! A worker owns nothing of the pool's state: it pulls records off the
//! pending queue and pushes status records onto the message queue, and that
//! is the whole of its interface. Workers are detached; the controller never
//! joins them. A worker terminates only when it dequeues an `Exit` record.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use log::{debug, warn};

use crate::core::cancellation::CancellationToken;
use crate::core::error::{PoolError, Result};
use crate::core::record::{JobData, JobRecord};
use crate::core::task::{JobContext, WorkFn};
use crate::queue::RecordQueue;

/// Spawns one detached worker thread running [`run`].
pub(crate) fn spawn<T>(
    id: usize,
    name_prefix: &str,
    pending: Arc<RecordQueue<T>>,
    messages: Arc<RecordQueue<T>>,
    work: WorkFn<T>,
    token: CancellationToken,
) -> Result<()>
where
    T: Send + Sync + 'static,
{
    thread::Builder::new()
        .name(format!("{}-{}", name_prefix, id))
        .spawn(move || run(id, pending, messages, work, token))
        .map_err(|source| PoolError::spawn(id, source))?;
    Ok(())
}

/// Main worker loop: fetch a job, execute it, report, repeat until told to
/// exit.
fn run<T>(
    id: usize,
    pending: Arc<RecordQueue<T>>,
    messages: Arc<RecordQueue<T>>,
    work: WorkFn<T>,
    token: CancellationToken,
) where
    T: Send + Sync + 'static,
{
    debug!("worker {} started", id);

    loop {
        let record = match pending.pop() {
            Some(record) => record,
            None => break,
        };

        let job = match record {
            JobRecord::Exit => break,
            JobRecord::Work(job) => job,
            // Only Work and Exit belong on the pending queue.
            _ => continue,
        };

        // Work that raced with cancel: discard it and wait for the pill.
        if token.is_cancelled() {
            continue;
        }

        messages.push(JobRecord::Work(job.clone()));
        let mut ctx = JobContext::new(job.clone(), Arc::clone(&messages), token.clone());
        execute(id, &job, &mut ctx, &work, &messages, &token);
    }

    debug!("worker {} exiting", id);
}

/// Runs one job until its completion flag is set, the pool is canceled, or
/// the work function fails, pushing the terminal record on the message queue.
///
/// Errors and panics are caught here and never unwind across the thread
/// boundary; the worker survives to pick up the next job.
fn execute<T>(
    id: usize,
    job: &JobData<T>,
    ctx: &mut JobContext<T>,
    work: &WorkFn<T>,
    messages: &RecordQueue<T>,
    token: &CancellationToken,
) where
    T: Send + Sync + 'static,
{
    loop {
        let result = catch_unwind(AssertUnwindSafe(|| work(job.payload(), &mut *ctx)));
        ctx.advance();

        match result {
            Ok(Ok(())) => {
                if ctx.is_completed() {
                    messages.push(JobRecord::Complete(job.clone()));
                    return;
                }
                if token.is_cancelled() {
                    // No terminal record: the job was abandoned, and the
                    // Exit pill is already waiting on the pending queue.
                    return;
                }
            }
            Ok(Err(err)) => {
                warn!("worker {}: job {} failed: {}", id, job.id(), err);
                messages.push(JobRecord::Error(job.clone(), err));
                return;
            }
            Err(panic) => {
                let message = panic_message(panic);
                warn!("worker {}: job {} panicked: {}", id, job.id(), message);
                messages.push(JobRecord::Error(job.clone(), PoolError::panicked(message)));
                return;
            }
        }
    }
}

pub(crate) fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
