use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::types::ProbeOutcome;

/// Thread-safe collector of probe results shared by all workers.
#[derive(Clone, Debug, Default)]
pub struct ResultAggregator {
    probed: Arc<AtomicU64>,
    open_ports: Arc<Mutex<Vec<u16>>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an outcome and keep its port if it was open.
    pub async fn submit(&self, outcome: ProbeOutcome) {
        if outcome.is_open() {
            self.record(outcome.port).await;
        }
        self.probed.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn record(&self, port: u16) {
        self.open_ports.lock().await.push(port);
    }

    pub fn probed(&self) -> u64 {
        self.probed.load(Ordering::Relaxed)
    }

    /// Recorded open ports, ascending and deduplicated. Only complete once
    /// the work queue has drained.
    pub async fn snapshot(&self) -> Vec<u16> {
        let mut ports = self.open_ports.lock().await.clone();
        ports.sort_unstable();
        ports.dedup();
        ports
    }
}
