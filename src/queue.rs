//! Thread-safe FIFO queues carrying job records between threads.
//!
//! Both pool queues are unbounded MPMC channels. The pending queue is popped
//! blocking by workers and non-blocking by the single-threaded emulation; the
//! message queue is drained non-blocking, only by the main thread, once per
//! tick. Records from a single producer are observed in the order that
//! producer pushed them.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::core::record::JobRecord;

/// An unbounded FIFO of [`JobRecord`]s backed by a crossbeam channel.
///
/// The queue holds both ends of its channel, so pushes cannot fail while the
/// queue is alive; it is shared between threads behind an [`Arc`](std::sync::Arc).
pub(crate) struct RecordQueue<T> {
    sender: Sender<JobRecord<T>>,
    receiver: Receiver<JobRecord<T>>,
}

impl<T> RecordQueue<T> {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Pushes one record onto the tail of the queue.
    pub fn push(&self, record: JobRecord<T>) {
        // Both channel ends live as long as the queue, so this cannot fail.
        let _ = self.sender.send(record);
    }

    /// Blocking pop. Returns `None` only if the channel disconnects, which
    /// cannot happen while the owning pool is alive.
    pub fn pop(&self) -> Option<JobRecord<T>> {
        self.receiver.recv().ok()
    }

    /// Non-blocking pop.
    pub fn try_pop(&self) -> Option<JobRecord<T>> {
        self.receiver.try_recv().ok()
    }

    /// Discards every record currently in the queue.
    pub fn clear(&self) {
        while self.try_pop().is_some() {}
    }

    /// Number of records currently queued (approximate under concurrency).
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::JobData;
    use std::sync::Arc;
    use std::thread;

    fn work_record(n: u32) -> JobRecord<u32> {
        JobRecord::Work(JobData::new(n))
    }

    #[test]
    fn test_fifo_order() {
        let queue = RecordQueue::new();
        queue.push(work_record(1));
        queue.push(work_record(2));
        queue.push(work_record(3));

        let mut seen = Vec::new();
        while let Some(JobRecord::Work(job)) = queue.try_pop() {
            seen.push(*job.payload());
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_try_pop_empty() {
        let queue: RecordQueue<u32> = RecordQueue::new();
        assert!(queue.try_pop().is_none());
    }

    #[test]
    fn test_clear() {
        let queue = RecordQueue::new();
        queue.push(work_record(1));
        queue.push(JobRecord::Exit);
        queue.clear();

        assert_eq!(queue.len(), 0);
        assert!(queue.try_pop().is_none());
    }

    #[test]
    fn test_blocking_pop_wakes_on_push() {
        let queue = Arc::new(RecordQueue::new());
        let producer = Arc::clone(&queue);

        let handle = thread::spawn(move || match queue.pop() {
            Some(JobRecord::Work(job)) => *job.payload(),
            _ => panic!("expected a work record"),
        });

        producer.push(work_record(7));
        assert_eq!(handle.join().unwrap(), 7);
    }
}
