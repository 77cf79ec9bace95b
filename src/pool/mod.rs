//! The pool controller and its background workers.

pub mod config;
pub mod thread_pool;
pub(crate) mod worker;

pub use config::{PoolConfig, ThreadMode};
pub use thread_pool::ThreadPool;
