//! Core types: errors, job records, cancellation and the single-job
//! execution primitive.

pub mod cancellation;
pub mod error;
pub mod record;
pub mod task;

pub use cancellation::CancellationToken;
pub use error::{PoolError, Result};
pub use record::{JobData, JobId};
pub use task::{Clock, JobContext, SystemClock, WorkFn};
