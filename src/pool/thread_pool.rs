//! The pool controller.
//!
//! All pool state lives on the thread that created the pool (the "main"
//! thread) and is mutated only there. Workers never touch it: every
//! cross-thread fact travels through the message queue and is applied during
//! [`ThreadPool::tick`], once per frame or loop iteration. The counters are
//! plain fields, not atomics; calling `queue`, `tick` or `cancel` from any
//! other thread is a usage error, not a race to be locked away.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use log::{debug, error, trace};

use crate::core::cancellation::CancellationToken;
use crate::core::error::{PoolError, Result};
use crate::core::record::{JobData, JobRecord};
use crate::core::task::{Clock, JobContext, SystemClock, WorkFn};
use crate::pool::config::{PoolConfig, ThreadMode};
use crate::pool::worker;
use crate::queue::RecordQueue;

type StartedFn<T> = Box<dyn FnMut(&JobData<T>) + Send>;
type ProgressFn<T> = Box<dyn FnMut(&JobData<T>, &T) + Send>;
type CompletedFn<T> = Box<dyn FnMut(&JobData<T>) + Send>;
type FailedFn<T> = Box<dyn FnMut(&JobData<T>, &PoolError) + Send>;
type FinishedFn = Box<dyn FnMut() + Send>;

/// The job currently running on the single-threaded scheduler.
struct CurrentJob<T> {
    job: JobData<T>,
    ctx: JobContext<T>,
}

/// A self-scaling pool of background workers driven by a per-tick controller.
///
/// Jobs are queued with an opaque payload and executed by a single work
/// function shared by the whole pool. Worker threads are spawned on demand up
/// to `max_threads` and retired down to `min_threads` as the queue drains.
/// All notifications fire on the creating thread, from inside [`tick`].
///
/// In [`ThreadMode::SingleThreaded`] no threads are spawned; the controller
/// itself runs at most one job at a time, spending at most
/// `time_slice × frame_budget` per tick.
///
/// [`tick`]: ThreadPool::tick
pub struct ThreadPool<T> {
    config: PoolConfig,
    work: Option<WorkFn<T>>,
    pending: Arc<RecordQueue<T>>,
    messages: Arc<RecordQueue<T>>,
    token: CancellationToken,
    clock: Box<dyn Clock>,
    main_thread: ThreadId,

    live_threads: usize,
    active_threads: usize,
    pending_estimate: usize,
    next_worker_id: usize,
    registered: bool,
    canceled: bool,
    finished: bool,
    current: Option<CurrentJob<T>>,

    on_started: Option<StartedFn<T>>,
    on_progress: Option<ProgressFn<T>>,
    on_completed: Option<CompletedFn<T>>,
    on_failed: Option<FailedFn<T>>,
    on_finished: Option<FinishedFn>,
}

impl<T> fmt::Debug for ThreadPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("config", &self.config)
            .field("live_threads", &self.live_threads)
            .field("active_threads", &self.active_threads)
            .field("pending_estimate", &self.pending_estimate)
            .field("registered", &self.registered)
            .field("canceled", &self.canceled)
            .finish()
    }
}

impl<T: Send + Sync + 'static> ThreadPool<T> {
    /// Create a pool with the given thread-count bounds and work function.
    pub fn new<F>(min_threads: usize, max_threads: usize, work: F) -> Result<Self>
    where
        F: Fn(&T, &mut JobContext<T>) -> Result<()> + Send + Sync + 'static,
    {
        let mut pool = Self::with_config(PoolConfig::new(min_threads, max_threads))?;
        pool.set_work(work);
        Ok(pool)
    }

    /// Create a pool from a configuration. A work function must be set with
    /// [`set_work`](Self::set_work) before any job can be queued.
    ///
    /// The calling thread becomes the pool's designated main thread.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            work: None,
            pending: Arc::new(RecordQueue::new()),
            messages: Arc::new(RecordQueue::new()),
            token: CancellationToken::new(),
            clock: Box::new(SystemClock),
            main_thread: thread::current().id(),
            live_threads: 0,
            active_threads: 0,
            pending_estimate: 0,
            next_worker_id: 0,
            registered: false,
            canceled: false,
            finished: false,
            current: None,
            on_started: None,
            on_progress: None,
            on_completed: None,
            on_failed: None,
            on_finished: None,
        })
    }

    /// Set the work function shared by every job in this pool.
    pub fn set_work<F>(&mut self, work: F)
    where
        F: Fn(&T, &mut JobContext<T>) -> Result<()> + Send + Sync + 'static,
    {
        self.work = Some(Arc::new(work));
    }

    /// Replace the timestamp source used by the single-threaded scheduler.
    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    /// Set the "job started" notification.
    pub fn on_started<F>(&mut self, callback: F)
    where
        F: FnMut(&JobData<T>) + Send + 'static,
    {
        self.on_started = Some(Box::new(callback));
    }

    /// Set the "progress" notification.
    pub fn on_progress<F>(&mut self, callback: F)
    where
        F: FnMut(&JobData<T>, &T) + Send + 'static,
    {
        self.on_progress = Some(Box::new(callback));
    }

    /// Set the "job completed" notification.
    pub fn on_completed<F>(&mut self, callback: F)
    where
        F: FnMut(&JobData<T>) + Send + 'static,
    {
        self.on_completed = Some(Box::new(callback));
    }

    /// Set the "job failed" notification.
    pub fn on_failed<F>(&mut self, callback: F)
    where
        F: FnMut(&JobData<T>, &PoolError) + Send + 'static,
    {
        self.on_failed = Some(Box::new(callback));
    }

    /// Set the "all work finished" notification, fired once per quiescent
    /// period when the last active job completes and none remain pending.
    pub fn on_finished<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_finished = Some(Box::new(callback));
    }

    /// Enqueue one job. Main-thread-only.
    ///
    /// # Errors
    ///
    /// - [`PoolError::WrongThread`] - called off the creating thread
    /// - [`PoolError::ShutDown`] - the pool has been canceled
    /// - [`PoolError::NoWorkFunction`] - no work function was configured
    pub fn queue(&mut self, payload: T) -> Result<()> {
        self.ensure_main_thread("queue")?;
        if self.canceled {
            return Err(PoolError::ShutDown);
        }
        if self.work.is_none() {
            return Err(PoolError::NoWorkFunction);
        }

        let job = JobData::new(payload);
        trace!("queued job {}", job.id());
        self.pending.push(JobRecord::Work(job));
        self.pending_estimate += 1;
        self.finished = false;
        self.registered = true;
        Ok(())
    }

    /// Advance the pool by one tick. Main-thread-only; invoked once per
    /// frame or loop iteration by the external tick source.
    ///
    /// Multi-threaded mode grows the pool to match demand, drains the
    /// message queue (dispatching notifications and re-evaluating the shrink
    /// rule after every finished job), and deregisters itself once no
    /// threads remain live. Single-threaded mode runs the current job for at
    /// most its time slice, then drains.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if a worker thread could not be created;
    /// the pool's state is untouched by the failed spawn and the next tick
    /// retries, since demand persists.
    pub fn tick(&mut self) -> Result<()> {
        self.ensure_main_thread("tick")?;
        if self.canceled || !self.registered {
            return Ok(());
        }

        match self.config.mode {
            ThreadMode::MultiThreaded => {
                self.grow()?;
                self.drain();
                if self.live_threads == 0 {
                    self.registered = false;
                }
            }
            ThreadMode::SingleThreaded => {
                self.run_slice();
                self.drain();
                if self.current.is_none() && self.pending_estimate == 0 {
                    self.registered = false;
                }
            }
        }
        Ok(())
    }

    /// Irreversibly shut the pool down. Main-thread-only; idempotent.
    ///
    /// Clears all pending work, signals every live thread to exit and drops
    /// undelivered status records. In-flight jobs are not interrupted; their
    /// threads retire after the current job. No job may be queued afterward.
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_main_thread("cancel")?;
        if self.canceled {
            return Ok(());
        }

        debug!(
            "canceling pool: {} live threads, {} pending jobs dropped",
            self.live_threads, self.pending_estimate
        );
        self.token.cancel();
        self.pending.clear();
        for _ in 0..self.live_threads {
            self.pending.push(JobRecord::Exit);
        }
        self.messages.clear();

        self.live_threads = 0;
        self.active_threads = 0;
        self.pending_estimate = 0;
        self.current = None;
        self.canceled = true;
        self.registered = false;
        Ok(())
    }

    /// Background threads currently alive (idle or busy), excluding threads
    /// already signaled to exit. Always 0 in single-threaded mode.
    pub fn live_threads(&self) -> usize {
        self.live_threads
    }

    /// Threads currently executing a job. In single-threaded mode this is
    /// the 0-or-1 in-flight marker.
    pub fn active_threads(&self) -> usize {
        self.active_threads
    }

    /// Live threads not currently executing a job.
    pub fn idle_threads(&self) -> usize {
        self.live_threads.saturating_sub(self.active_threads)
    }

    /// Current shrink floor.
    pub fn min_threads(&self) -> usize {
        self.config.min_threads
    }

    /// Current growth cap.
    pub fn max_threads(&self) -> usize {
        self.config.max_threads
    }

    /// Change the shrink floor. Takes effect on the next tick.
    pub fn set_min_threads(&mut self, min_threads: usize) {
        self.config.min_threads = min_threads;
    }

    /// Change the growth cap. Takes effect on the next tick; surplus threads
    /// retire as their jobs finish.
    pub fn set_max_threads(&mut self, max_threads: usize) {
        self.config.max_threads = max_threads;
    }

    /// Whether the pool is registered with the tick source. `false` once
    /// fully idle (ticks are no-ops) until the next [`queue`](Self::queue).
    pub fn is_active(&self) -> bool {
        self.registered
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// The configured execution mode.
    pub fn mode(&self) -> ThreadMode {
        self.config.mode
    }

    fn ensure_main_thread(&self, operation: &'static str) -> Result<()> {
        if thread::current().id() != self.main_thread {
            return Err(PoolError::wrong_thread(operation));
        }
        Ok(())
    }

    /// Spawn workers while demand outstrips the idle threads, up to the cap.
    ///
    /// `pending_estimate` may transiently overcount (a worker that has just
    /// dequeued a job has not yet reported it), so this can spawn one thread
    /// too many under race; the shrink rule retires it after the next
    /// finished job. That slack is the price of keeping the scaling decision
    /// free of cross-thread locking.
    fn grow(&mut self) -> Result<()> {
        while self.pending_estimate > self.idle_threads()
            && self.live_threads < self.config.max_threads
        {
            let work = match &self.work {
                Some(work) => Arc::clone(work),
                None => return Err(PoolError::NoWorkFunction),
            };
            let id = self.next_worker_id;
            if let Err(err) = worker::spawn(
                id,
                &self.config.thread_name_prefix,
                Arc::clone(&self.pending),
                Arc::clone(&self.messages),
                work,
                self.token.clone(),
            ) {
                error!("failed to spawn worker {}: {}", id, err);
                return Err(err);
            }
            self.next_worker_id += 1;
            self.live_threads += 1;
            debug!("spawned worker {} ({} live)", id, self.live_threads);
        }
        Ok(())
    }

    /// Drain the message queue until empty and dispatch notifications.
    /// Per-tick latency is bounded by queue depth, not a fixed scan limit.
    fn drain(&mut self) {
        while let Some(record) = self.messages.try_pop() {
            match record {
                JobRecord::Work(job) => {
                    self.pending_estimate = self.pending_estimate.saturating_sub(1);
                    self.active_threads += 1;
                    if let Some(callback) = self.on_started.as_mut() {
                        callback(&job);
                    }
                }
                JobRecord::Progress(job, value) => {
                    if let Some(callback) = self.on_progress.as_mut() {
                        callback(&job, &value);
                    }
                }
                JobRecord::Complete(job) => {
                    self.active_threads = self.active_threads.saturating_sub(1);
                    if let Some(callback) = self.on_completed.as_mut() {
                        callback(&job);
                    }
                    if self.active_threads == 0 && self.pending_estimate == 0 && !self.finished {
                        self.finished = true;
                        if let Some(callback) = self.on_finished.as_mut() {
                            callback();
                        }
                    }
                    self.shrink();
                }
                JobRecord::Error(job, err) => {
                    self.active_threads = self.active_threads.saturating_sub(1);
                    if let Some(callback) = self.on_failed.as_mut() {
                        callback(&job, &err);
                    }
                    self.shrink();
                }
                // Workers never report Exit.
                JobRecord::Exit => {}
            }
        }
    }

    /// Retire one idle thread if the pool is over its bounds. Re-evaluated
    /// after every finished job so runtime changes to the bounds take effect
    /// continuously.
    fn shrink(&mut self) {
        let surplus_idle = self.pending_estimate < self.idle_threads()
            && self.live_threads > self.config.min_threads;
        if surplus_idle || self.live_threads > self.config.max_threads {
            self.live_threads -= 1;
            self.pending.push(JobRecord::Exit);
            trace!("signaled one worker to exit ({} live)", self.live_threads);
        }
    }

    /// One time slice of the cooperative single-threaded scheduler: adopt a
    /// pending job if none is current, then run it until its completion flag
    /// is set, the deadline passes, or it fails. At most one job is current
    /// at a time, and only one is adopted per tick.
    fn run_slice(&mut self) {
        if self.current.is_none() {
            match self.pending.try_pop() {
                Some(JobRecord::Work(job)) => {
                    self.messages.push(JobRecord::Work(job.clone()));
                    let ctx = JobContext::new(
                        job.clone(),
                        Arc::clone(&self.messages),
                        self.token.clone(),
                    );
                    self.current = Some(CurrentJob { job, ctx });
                }
                _ => return,
            }
        }

        let work = match &self.work {
            Some(work) => Arc::clone(work),
            None => return,
        };
        let deadline = self.clock.now() + self.config.frame_budget.mul_f64(self.config.time_slice);

        while let Some(current) = self.current.as_mut() {
            let result =
                catch_unwind(AssertUnwindSafe(|| work(current.job.payload(), &mut current.ctx)));
            current.ctx.advance();

            match result {
                Ok(Ok(())) => {
                    if current.ctx.is_completed() {
                        self.messages.push(JobRecord::Complete(current.job.clone()));
                        self.current = None;
                    } else if self.clock.now() >= deadline {
                        // Yield the remaining work to the next tick.
                        break;
                    }
                }
                Ok(Err(err)) => {
                    self.messages
                        .push(JobRecord::Error(current.job.clone(), err));
                    self.current = None;
                }
                Err(panic) => {
                    let message = worker::panic_message(panic);
                    self.messages.push(JobRecord::Error(
                        current.job.clone(),
                        PoolError::panicked(message),
                    ));
                    self.current = None;
                }
            }
        }
    }
}

impl<T> Drop for ThreadPool<T> {
    fn drop(&mut self) {
        // Workers are detached; make sure each one has a pill to retire on.
        if !self.canceled {
            self.token.cancel();
            self.pending.clear();
            for _ in 0..self.live_threads {
                self.pending.push(JobRecord::Exit);
            }
        }
    }
}
