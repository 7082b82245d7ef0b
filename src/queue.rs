use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

/// Ports waiting to be probed, drained concurrently by the worker pool.
///
/// Tracks two things: tasks not yet handed out (`len`) and tasks handed out
/// but not yet acknowledged (`in_flight`). The drain barrier opens once both
/// reach zero.
#[derive(Debug, Default)]
pub struct WorkQueue {
    pending: Mutex<VecDeque<u16>>,
    outstanding: AtomicUsize,
    dispatched: AtomicU64,
    drained: Notify,
}

/// A dequeued port. Dropping it acknowledges the task as fully processed.
#[derive(Debug)]
pub struct PortTask {
    port: u16,
    queue: Arc<WorkQueue>,
}

impl PortTask {
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for PortTask {
    fn drop(&mut self) {
        self.queue.acknowledge();
    }
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue holding one task per port.
    pub fn with_ports(ports: impl IntoIterator<Item = u16>) -> Arc<Self> {
        let queue = Self::new();
        for port in ports {
            queue.enqueue(port);
        }
        Arc::new(queue)
    }

    pub fn enqueue(&self, port: u16) {
        let mut pending = self.lock_pending();
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        pending.push_back(port);
    }

    /// Hand out the next port, or `None` once nothing is left. Never waits.
    pub fn try_dequeue(self: &Arc<Self>) -> Option<PortTask> {
        let port = self.lock_pending().pop_front()?;
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        Some(PortTask {
            port,
            queue: Arc::clone(self),
        })
    }

    /// Tasks not yet dequeued.
    pub fn len(&self) -> usize {
        self.lock_pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tasks dequeued but not yet acknowledged.
    pub fn in_flight(&self) -> usize {
        let pending = self.lock_pending();
        self.outstanding.load(Ordering::Acquire) - pending.len()
    }

    /// Total tasks ever handed out.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn is_drained(&self) -> bool {
        self.outstanding.load(Ordering::Acquire) == 0
    }

    /// Wait until every enqueued task has been dequeued and acknowledged.
    pub async fn wait_until_drained(&self) {
        loop {
            // Registered on creation, so a notify between the check and the
            // await is not lost.
            let notified = self.drained.notified();
            if self.is_drained() {
                return;
            }
            notified.await;
        }
    }

    fn acknowledge(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.drained.notify_waiters();
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, VecDeque<u16>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
