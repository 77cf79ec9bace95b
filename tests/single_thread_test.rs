//! Cooperative single-threaded scheduler scenarios.
//!
//! With a tiny frame budget every tick performs exactly one invocation of
//! the work function before the deadline passes, which makes the schedule
//! fully deterministic: no worker threads, no sleeps.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tickpool::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Event {
    Started(JobId),
    Progress(u64),
    Completed(JobId),
    Failed(JobId),
    Finished,
}

type EventLog = Arc<Mutex<Vec<Event>>>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn attach_log(pool: &mut ThreadPool<u64>) -> EventLog {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&log);
    pool.on_started(move |job| sink.lock().unwrap().push(Event::Started(job.id())));
    let sink = Arc::clone(&log);
    pool.on_progress(move |_, value| sink.lock().unwrap().push(Event::Progress(*value)));
    let sink = Arc::clone(&log);
    pool.on_completed(move |job| sink.lock().unwrap().push(Event::Completed(job.id())));
    let sink = Arc::clone(&log);
    pool.on_failed(move |job, _| sink.lock().unwrap().push(Event::Failed(job.id())));
    let sink = Arc::clone(&log);
    pool.on_finished(move || sink.lock().unwrap().push(Event::Finished));

    log
}

/// One invocation per tick: the sliced deadline (half of one nanosecond,
/// rounded down to zero) has always passed after the first pass.
fn one_iteration_per_tick_config() -> PoolConfig {
    PoolConfig::new(0, 1)
        .with_mode(ThreadMode::SingleThreaded)
        .with_frame_budget(Duration::from_nanos(1))
}

#[test]
fn test_job_spreads_across_ticks() {
    init_logging();
    let mut pool = ThreadPool::with_config(one_iteration_per_tick_config()).unwrap();
    assert_eq!(pool.mode(), ThreadMode::SingleThreaded);
    // Completes on its fifth invocation.
    pool.set_work(|_: &u64, ctx: &mut JobContext<u64>| {
        if ctx.iterations() == 4 {
            ctx.complete();
        }
        Ok(())
    });
    let log = attach_log(&mut pool);

    pool.queue(1).unwrap();
    pool.queue(2).unwrap();

    let events_after_tick = |pool: &mut ThreadPool<u64>, log: &EventLog| {
        pool.tick().unwrap();
        log.lock().unwrap().clone()
    };

    // Tick 1: the first job is adopted and announced; no completion yet.
    let events = events_after_tick(&mut pool, &log);
    assert_eq!(events.len(), 1);
    let first_id = match events[0] {
        Event::Started(id) => id,
        other => panic!("expected a started event, got {:?}", other),
    };
    assert_eq!(pool.active_threads(), 1);

    // Ticks 2-4: work continues with no notifications; the second job must
    // not start while the first is current.
    for _ in 0..3 {
        let events = events_after_tick(&mut pool, &log);
        assert_eq!(events.len(), 1);
    }

    // Tick 5: fifth invocation sets the flag; the job completes.
    let events = events_after_tick(&mut pool, &log);
    assert_eq!(events.last(), Some(&Event::Completed(first_id)));
    assert_eq!(pool.active_threads(), 0);

    // Tick 6: only now does the second job start.
    let events = events_after_tick(&mut pool, &log);
    let second_id = match events.last() {
        Some(Event::Started(id)) => *id,
        other => panic!("expected a started event, got {:?}", other),
    };
    assert_ne!(second_id, first_id);

    // Ticks 7-10: the second job runs out and the pool quiesces.
    for _ in 0..4 {
        pool.tick().unwrap();
    }
    let events = log.lock().unwrap().clone();
    assert_eq!(events[events.len() - 2], Event::Completed(second_id));
    assert_eq!(events[events.len() - 1], Event::Finished);
    assert!(!pool.is_active());
}

#[test]
fn test_generous_slice_completes_in_one_tick() {
    init_logging();
    // A real frame budget lets a short job run to completion within a
    // single tick: started and completed fire together.
    let config = PoolConfig::new(0, 1)
        .with_mode(ThreadMode::SingleThreaded)
        .with_time_slice(1.0)
        .with_frame_budget(Duration::from_millis(100));
    let mut pool = ThreadPool::with_config(config).unwrap();
    pool.set_work(|_: &u64, ctx: &mut JobContext<u64>| {
        if ctx.iterations() == 9 {
            ctx.complete();
        }
        Ok(())
    });
    let log = attach_log(&mut pool);

    pool.queue(1).unwrap();
    pool.tick().unwrap();

    let events = log.lock().unwrap().clone();
    assert!(matches!(events[0], Event::Started(_)));
    assert!(matches!(events[1], Event::Completed(_)));
    assert_eq!(events[2], Event::Finished);
}

#[test]
fn test_progress_crosses_ticks() {
    init_logging();
    let mut pool = ThreadPool::with_config(one_iteration_per_tick_config()).unwrap();
    pool.set_work(|_: &u64, ctx: &mut JobContext<u64>| {
        ctx.progress(ctx.iterations());
        if ctx.iterations() == 2 {
            ctx.complete();
        }
        Ok(())
    });
    let log = attach_log(&mut pool);

    pool.queue(1).unwrap();
    for _ in 0..3 {
        pool.tick().unwrap();
    }

    let progress: Vec<u64> = log
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            Event::Progress(v) => Some(*v),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![0, 1, 2]);
}

#[test]
fn test_error_on_first_iteration() {
    init_logging();
    let mut pool = ThreadPool::with_config(one_iteration_per_tick_config()).unwrap();
    pool.set_work(|n: &u64, ctx: &mut JobContext<u64>| {
        if *n == 13 {
            return Err(PoolError::job("unlucky payload"));
        }
        ctx.complete();
        Ok(())
    });
    let log = attach_log(&mut pool);

    pool.queue(13).unwrap();
    pool.tick().unwrap();

    // Started and failed land in the same tick; never a completion.
    let events = log.lock().unwrap().clone();
    assert!(matches!(events[0], Event::Started(_)));
    assert!(matches!(events[1], Event::Failed(_)));
    assert_eq!(events.len(), 2);

    // The slot is immediately reusable.
    pool.queue(7).unwrap();
    pool.tick().unwrap();
    let events = log.lock().unwrap().clone();
    assert!(matches!(events[2], Event::Started(_)));
    assert!(matches!(events[3], Event::Completed(_)));
}

#[test]
fn test_panic_is_contained_in_tick() {
    init_logging();
    let mut pool = ThreadPool::with_config(one_iteration_per_tick_config()).unwrap();
    pool.set_work(|_: &u64, _| panic!("intentional panic for testing"));
    let log = attach_log(&mut pool);

    pool.queue(1).unwrap();
    // Must not unwind out of the tick.
    pool.tick().unwrap();

    let events = log.lock().unwrap().clone();
    assert!(matches!(events[1], Event::Failed(_)));
}

#[test]
fn test_cancel_discards_current_and_pending() {
    init_logging();
    let mut pool = ThreadPool::with_config(one_iteration_per_tick_config()).unwrap();
    pool.set_work(|_: &u64, _| Ok(())); // never completes
    let log = attach_log(&mut pool);

    pool.queue(1).unwrap();
    pool.queue(2).unwrap();
    pool.tick().unwrap();
    assert_eq!(pool.active_threads(), 1);

    pool.cancel().unwrap();
    assert_eq!(pool.active_threads(), 0);
    assert!(!pool.is_active());
    assert!(matches!(pool.queue(3), Err(PoolError::ShutDown)));

    let before = log.lock().unwrap().len();
    for _ in 0..5 {
        pool.tick().unwrap();
    }
    assert_eq!(log.lock().unwrap().len(), before);
}
