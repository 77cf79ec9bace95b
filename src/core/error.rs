//! Error types for the worker pool

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur in the worker pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// A main-thread-only operation was called from another thread
    #[error("`{operation}` must be called from the thread that created the pool")]
    WrongThread {
        /// Name of the offending operation
        operation: &'static str,
    },

    /// The pool has been canceled; shutdown is terminal
    #[error("pool has been canceled and accepts no new jobs")]
    ShutDown,

    /// A job was queued before a work function was configured
    #[error("no work function has been configured")]
    NoWorkFunction,

    /// Failed to spawn a worker thread
    #[error("failed to spawn worker thread #{worker_id}: {source}")]
    Spawn {
        /// ID of the worker that failed to spawn
        worker_id: usize,
        /// Source IO error
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration with parameter
    #[error("invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: &'static str,
        /// Error message
        message: String,
    },

    /// A job's work function returned an error
    #[error("job failed: {message}")]
    JobFailed {
        /// Error message
        message: String,
    },

    /// A job's work function panicked
    #[error("job panicked: {message}")]
    JobPanicked {
        /// Panic message
        message: String,
    },
}

impl PoolError {
    /// Create a wrong-thread usage error
    pub fn wrong_thread(operation: &'static str) -> Self {
        PoolError::WrongThread { operation }
    }

    /// Create a spawn error
    pub fn spawn(worker_id: usize, source: std::io::Error) -> Self {
        PoolError::Spawn { worker_id, source }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: &'static str, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter,
            message: message.into(),
        }
    }

    /// Create a job failure error
    pub fn job(message: impl Into<String>) -> Self {
        PoolError::JobFailed {
            message: message.into(),
        }
    }

    /// Create a job panic error
    pub fn panicked(message: impl Into<String>) -> Self {
        PoolError::JobPanicked {
            message: message.into(),
        }
    }
}
