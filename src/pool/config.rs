//! Pool configuration.

use std::time::Duration;

use crate::core::error::{PoolError, Result};

/// Execution mode for the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadMode {
    /// Jobs run on background worker threads; the tick drains their status
    /// records and scales the pool.
    MultiThreaded,
    /// Jobs run cooperatively on the main thread, time-sliced across ticks.
    SingleThreaded,
}

impl Default for ThreadMode {
    fn default() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            ThreadMode::SingleThreaded
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            ThreadMode::MultiThreaded
        }
    }
}

/// Configuration for a [`ThreadPool`](crate::pool::ThreadPool).
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Floor for shrinking: the pool never signals itself below this many
    /// live threads (0 = the pool may go fully idle).
    pub min_threads: usize,
    /// Cap for growing (default: number of CPUs). May be lowered at runtime;
    /// surplus threads retire as their jobs finish.
    pub max_threads: usize,
    /// Execution mode. Defaults to [`ThreadMode::SingleThreaded`] on targets
    /// without native threads.
    pub mode: ThreadMode,
    /// Fraction of the frame budget the single-threaded scheduler may spend
    /// per tick, in `(0, 1]`. Default: 0.5
    pub time_slice: f64,
    /// Nominal frame budget for the single-threaded scheduler.
    /// Default: ~16.67ms (one 60Hz frame)
    pub frame_budget: Duration,
    /// Worker thread name prefix
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_threads: 0,
            max_threads: num_cpus::get(),
            mode: ThreadMode::default(),
            time_slice: 0.5,
            frame_budget: Duration::from_micros(16_667),
            thread_name_prefix: "pool-worker".to_string(),
        }
    }
}

impl PoolConfig {
    /// Create a configuration with the given thread-count bounds.
    #[must_use]
    pub fn new(min_threads: usize, max_threads: usize) -> Self {
        Self {
            min_threads,
            max_threads,
            ..Default::default()
        }
    }

    /// Set the execution mode.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_mode(mut self, mode: ThreadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the single-threaded time-slice fraction.
    ///
    /// A smaller slice spreads a job across more ticks; the pool never
    /// monopolizes more than this share of the frame budget per tick.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_time_slice(mut self, fraction: f64) -> Self {
        self.time_slice = fraction;
        self
    }

    /// Set the nominal frame budget used by the single-threaded scheduler.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = budget;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_threads == 0 {
            return Err(PoolError::invalid_config(
                "max_threads",
                "must be at least 1",
            ));
        }
        if self.min_threads > self.max_threads {
            return Err(PoolError::invalid_config(
                "min_threads",
                format!(
                    "must not exceed max_threads ({} > {})",
                    self.min_threads, self.max_threads
                ),
            ));
        }
        if !(self.time_slice > 0.0 && self.time_slice <= 1.0) {
            return Err(PoolError::invalid_config(
                "time_slice",
                "must be in (0, 1]",
            ));
        }
        if self.frame_budget.is_zero() {
            return Err(PoolError::invalid_config(
                "frame_budget",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PoolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_threads, 0);
        assert!(config.max_threads >= 1);
    }

    #[test]
    fn test_zero_max_threads_rejected() {
        let config = PoolConfig::new(0, 0);
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidConfig { parameter: "max_threads", .. })
        ));
    }

    #[test]
    fn test_min_above_max_rejected() {
        let config = PoolConfig::new(4, 2);
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidConfig { parameter: "min_threads", .. })
        ));
    }

    #[test]
    fn test_time_slice_bounds() {
        assert!(PoolConfig::new(0, 1).with_time_slice(0.0).validate().is_err());
        assert!(PoolConfig::new(0, 1).with_time_slice(1.5).validate().is_err());
        assert!(PoolConfig::new(0, 1).with_time_slice(1.0).validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = PoolConfig::new(1, 8)
            .with_mode(ThreadMode::SingleThreaded)
            .with_time_slice(0.25)
            .with_frame_budget(Duration::from_millis(8))
            .with_thread_name_prefix("loader");

        assert_eq!(config.mode, ThreadMode::SingleThreaded);
        assert_eq!(config.time_slice, 0.25);
        assert_eq!(config.frame_budget, Duration::from_millis(8));
        assert_eq!(config.thread_name_prefix, "loader");
        assert!(config.validate().is_ok());
    }
}
