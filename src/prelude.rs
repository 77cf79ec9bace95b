//! Convenient re-exports for common types

pub use crate::core::{JobContext, JobData, JobId, PoolError, Result};
pub use crate::pool::{PoolConfig, ThreadMode, ThreadPool};
