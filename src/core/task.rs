//! The single-job execution primitive the pool is built on.
//!
//! Every job in a pool shares one [`WorkFn`]; what distinguishes jobs is the
//! payload and the [`JobContext`] handed to the work function on each
//! invocation. The context carries the per-job completion flag, the iteration
//! counter and the progress channel back to the main thread. The runner (a
//! worker thread, or the single-threaded scheduler) keeps invoking the work
//! function until the flag is set, the pool is canceled, or an error occurs.

use std::sync::Arc;
use std::time::Instant;

use crate::core::cancellation::CancellationToken;
use crate::core::error::Result;
use crate::core::record::{JobData, JobId, JobRecord};
use crate::queue::RecordQueue;

/// The work function shared by every job in a pool.
///
/// Invoked repeatedly with the job's payload; one invocation is one
/// iteration. Long-running jobs should do a bounded amount of work per
/// iteration and call [`JobContext::complete`] when done, so that
/// cancellation stays responsive and the single-threaded scheduler can
/// honor its time slice.
pub type WorkFn<T> = Arc<dyn Fn(&T, &mut JobContext<T>) -> Result<()> + Send + Sync>;

/// Monotonic timestamp source.
///
/// Used only by the single-threaded time-slice calculation; injectable so
/// tests can drive the deadline deterministically.
pub trait Clock: Send {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Default [`Clock`] backed by [`Instant::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Per-job state handed to the work function on every invocation.
pub struct JobContext<T> {
    job: JobData<T>,
    messages: Arc<RecordQueue<T>>,
    token: CancellationToken,
    completed: bool,
    iterations: u64,
}

impl<T> JobContext<T> {
    pub(crate) fn new(
        job: JobData<T>,
        messages: Arc<RecordQueue<T>>,
        token: CancellationToken,
    ) -> Self {
        Self {
            job,
            messages,
            token,
            completed: false,
            iterations: 0,
        }
    }

    /// The identifier of the job this context belongs to.
    pub fn id(&self) -> JobId {
        self.job.id()
    }

    /// Signal that the job is done. The runner reports the completion on the
    /// main thread after the current invocation returns.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    /// Whether [`complete`](Self::complete) has been called.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Emit a progress value, delivered to the "progress" notification on
    /// the main thread during a later tick.
    pub fn progress(&self, value: T) {
        self.messages
            .push(JobRecord::Progress(self.job.clone(), value));
    }

    /// Number of completed invocations of the work function for this job.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Whether the pool has been canceled. In-flight work is never
    /// interrupted; a cooperative job checks this to finish early.
    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn advance(&mut self) {
        self.iterations += 1;
    }
}
