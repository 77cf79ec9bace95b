//! Job records exchanged between the controller and its workers.
//!
//! A record is immutable once created: ownership transfers fully to whichever
//! queue holds it, and copies made for the message queue share the payload
//! through an [`Arc`].

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::PoolError;

/// Unique identifier assigned to a job when it is queued.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub(crate) fn next() -> Self {
        JobId(Uuid::new_v4())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

/// One queued unit of work: its identifier plus the caller-supplied payload.
///
/// The payload is opaque to the pool and passed through untouched. Cloning a
/// `JobData` is cheap; all copies share the same payload.
pub struct JobData<T> {
    id: JobId,
    payload: Arc<T>,
}

impl<T> JobData<T> {
    pub(crate) fn new(payload: T) -> Self {
        Self {
            id: JobId::next(),
            payload: Arc::new(payload),
        }
    }

    /// The identifier assigned at queue time.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// The caller-supplied payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }
}

impl<T> Clone for JobData<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            payload: Arc::clone(&self.payload),
        }
    }
}

impl<T> fmt::Debug for JobData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobData({})", self.id)
    }
}

/// Tagged record carried by the pool's two queues.
///
/// `Work` and `Exit` travel from the controller to workers on the pending
/// queue; `Work` (the "started" announcement), `Progress`, `Complete` and
/// `Error` flow back on the message queue. `Exit` is a pure control signal
/// with no job attached.
pub(crate) enum JobRecord<T> {
    /// Run this job (pending queue) or announce it started (message queue).
    Work(JobData<T>),
    /// A progress value emitted by the running job.
    Progress(JobData<T>, T),
    /// The job's completion flag was set.
    Complete(JobData<T>),
    /// The job's work function returned an error or panicked.
    Error(JobData<T>, PoolError),
    /// Poison pill: the receiving worker terminates immediately.
    Exit,
}

impl<T> fmt::Debug for JobRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobRecord::Work(job) => write!(f, "Work({})", job.id()),
            JobRecord::Progress(job, _) => write!(f, "Progress({})", job.id()),
            JobRecord::Complete(job) => write!(f, "Complete({})", job.id()),
            JobRecord::Error(job, err) => write!(f, "Error({}, {})", job.id(), err),
            JobRecord::Exit => write!(f, "Exit"),
        }
    }
}
