use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::aggregator::ResultAggregator;
use crate::probe::Prober;
use crate::queue::WorkQueue;

/// Number of workers to start: never more than there is work.
pub fn pool_size(concurrency: usize, pending: usize) -> usize {
    concurrency.min(pending)
}

/// Everything a worker needs, shared by all workers of one scan.
pub struct WorkerContext<P> {
    pub addr: IpAddr,
    pub timeout: Duration,
    pub queue: Arc<WorkQueue>,
    pub aggregator: ResultAggregator,
    pub prober: Arc<P>,
    /// Receives each open port as soon as it is found.
    pub open_tx: Option<UnboundedSender<u16>>,
}

impl<P> Clone for WorkerContext<P> {
    fn clone(&self) -> Self {
        Self {
            addr: self.addr,
            timeout: self.timeout,
            queue: Arc::clone(&self.queue),
            aggregator: self.aggregator.clone(),
            prober: Arc::clone(&self.prober),
            open_tx: self.open_tx.clone(),
        }
    }
}

/// A fixed set of worker tasks draining one [`WorkQueue`].
pub struct WorkerPool {
    set: JoinSet<u64>,
    size: usize,
}

impl WorkerPool {
    /// Launch exactly `count` workers.
    pub fn start<P: Prober>(count: usize, ctx: WorkerContext<P>) -> Self {
        let mut set = JoinSet::new();
        for id in 0..count {
            set.spawn(run_worker(id, ctx.clone()));
        }
        Self { set, size: count }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Wait for every worker to exit; returns the number of ports probed.
    pub async fn join(mut self) -> u64 {
        let mut probed = 0;
        while let Some(res) = self.set.join_next().await {
            match res {
                Ok(n) => probed += n,
                Err(e) => warn!(error = %e, "worker task failed"),
            }
        }
        probed
    }
}

async fn run_worker<P: Prober>(id: usize, ctx: WorkerContext<P>) -> u64 {
    let mut probed = 0u64;
    while let Some(task) = ctx.queue.try_dequeue() {
        let outcome = ctx.prober.probe(ctx.addr, task.port(), ctx.timeout).await;
        if outcome.is_open() {
            debug!(worker = id, port = outcome.port, "open");
            if let Some(tx) = &ctx.open_tx {
                // A dropped listener only loses the live stream, not the result.
                let _ = tx.send(outcome.port);
            }
        }
        ctx.aggregator.submit(outcome).await;
        probed += 1;
        // `task` drops here, acknowledging the port.
    }
    debug!(worker = id, probed, "worker finished");
    probed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeOutcome;
    use std::future::Future;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    struct EvenPorts {
        seen: Mutex<Vec<u16>>,
    }

    impl Prober for EvenPorts {
        fn probe(
            &self,
            _addr: IpAddr,
            port: u16,
            _timeout: Duration,
        ) -> impl Future<Output = ProbeOutcome> + Send {
            self.seen.lock().unwrap().push(port);
            async move {
                tokio::task::yield_now().await;
                if port % 2 == 0 {
                    ProbeOutcome::open(port)
                } else {
                    ProbeOutcome::not_open(port)
                }
            }
        }
    }

    fn ctx(queue: Arc<WorkQueue>, prober: Arc<EvenPorts>) -> WorkerContext<EvenPorts> {
        WorkerContext {
            addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            timeout: Duration::from_millis(10),
            queue,
            aggregator: ResultAggregator::new(),
            prober,
            open_tx: None,
        }
    }

    #[test]
    fn pool_size_is_capped_by_work() {
        assert_eq!(pool_size(100, 10), 10);
        assert_eq!(pool_size(100, 1000), 100);
        assert_eq!(pool_size(1, 50), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn workers_drain_queue_exactly_once() {
        let queue = WorkQueue::with_ports(1..=300);
        let prober = Arc::new(EvenPorts {
            seen: Mutex::new(Vec::new()),
        });
        let ctx = ctx(Arc::clone(&queue), Arc::clone(&prober));
        let aggregator = ctx.aggregator.clone();
        let pool = WorkerPool::start(pool_size(16, queue.len()), ctx);
        assert_eq!(pool.size(), 16);

        queue.wait_until_drained().await;
        assert_eq!(pool.join().await, 300);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.in_flight(), 0);

        let mut seen = prober.seen.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, (1..=300).collect::<Vec<u16>>());
        let open = aggregator.snapshot().await;
        assert_eq!(open.len(), 150);
        assert!(open.iter().all(|p| p % 2 == 0));
    }

    #[tokio::test]
    async fn open_ports_are_streamed() {
        let queue = WorkQueue::with_ports(10..=13);
        let prober = Arc::new(EvenPorts {
            seen: Mutex::new(Vec::new()),
        });
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut ctx = ctx(Arc::clone(&queue), prober);
        ctx.open_tx = Some(tx);
        let pool = WorkerPool::start(2, ctx);
        queue.wait_until_drained().await;
        pool.join().await;

        let mut streamed = Vec::new();
        while let Some(p) = rx.recv().await {
            streamed.push(p);
        }
        streamed.sort_unstable();
        assert_eq!(streamed, vec![10, 12]);
    }
}
