use std::net::IpAddr;
use std::sync::Arc;

use ::time::{format_description::well_known, OffsetDateTime};
use tokio::net::lookup_host;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::aggregator::ResultAggregator;
use crate::error::ScanError;
use crate::pool::{pool_size, WorkerContext, WorkerPool};
use crate::probe::{Prober, TcpProber};
use crate::queue::WorkQueue;
use crate::types::{ScanRequest, ScanResult};

/// Scan the requested port range with TCP connects and a bounded worker pool.
///
/// - Resolves the host once up front and fails fast if it cannot be resolved.
/// - Starts `min(concurrency, range length)` workers draining a shared queue.
/// - Returns only after every port has been probed and acknowledged.
pub async fn run_scan(request: &ScanRequest) -> Result<ScanResult, ScanError> {
    Scanner::new().run(request).await
}

/// Variant that streams each open port to `open_tx` as soon as it is found.
pub async fn run_scan_with_events(
    request: &ScanRequest,
    open_tx: UnboundedSender<u16>,
) -> Result<ScanResult, ScanError> {
    Scanner::new().with_open_listener(open_tx).run(request).await
}

/// Scan coordinator, generic over how a single port is probed.
pub struct Scanner<P = TcpProber> {
    prober: Arc<P>,
    open_tx: Option<UnboundedSender<u16>>,
}

impl Scanner<TcpProber> {
    pub fn new() -> Self {
        Self::with_prober(TcpProber)
    }
}

impl Default for Scanner<TcpProber> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Prober> Scanner<P> {
    pub fn with_prober(prober: P) -> Self {
        Self {
            prober: Arc::new(prober),
            open_tx: None,
        }
    }

    pub fn with_open_listener(mut self, open_tx: UnboundedSender<u16>) -> Self {
        self.open_tx = Some(open_tx);
        self
    }

    /// Run one complete scan. Consumes the open-port listener, if any, so
    /// the receiving side sees the channel close once the scan is done.
    pub async fn run(mut self, request: &ScanRequest) -> Result<ScanResult, ScanError> {
        let addr = resolve_host(&request.host).await?;
        let queue = WorkQueue::with_ports(request.ports);
        let workers = pool_size(request.concurrency, queue.len());
        let aggregator = ResultAggregator::new();

        info!(
            host = %request.host,
            %addr,
            ports = %request.ports,
            workers,
            timeout_ms = request.timeout.as_millis() as u64,
            "starting scan"
        );

        let started_at = now_rfc3339();
        let start = Instant::now();
        let pool = WorkerPool::start(
            workers,
            WorkerContext {
                addr,
                timeout: request.timeout,
                queue: Arc::clone(&queue),
                aggregator: aggregator.clone(),
                prober: Arc::clone(&self.prober),
                open_tx: self.open_tx.take(),
            },
        );

        queue.wait_until_drained().await;
        let elapsed = start.elapsed();
        let probed_by_workers = pool.join().await;
        debug!(probed_by_workers, dispatched = queue.dispatched(), "pool joined");
        debug_assert!(queue.is_empty() && queue.in_flight() == 0);

        let open_ports = aggregator.snapshot().await;
        info!(
            open = open_ports.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scan complete"
        );

        Ok(ScanResult {
            host: request.host.clone(),
            address: addr,
            start_port: request.ports.start(),
            end_port: request.ports.end(),
            open_ports,
            elapsed,
            probed: aggregator.probed(),
            workers,
            started_at,
        })
    }
}

/// Resolve a host name or literal address to the first address returned.
pub async fn resolve_host(host: &str) -> Result<IpAddr, ScanError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }
    let unresolvable = || ScanError::Unresolvable {
        host: host.to_string(),
    };
    let mut addrs = lookup_host((host, 0)).await.map_err(|e| {
        debug!(host, error = %e, "lookup failed");
        unresolvable()
    })?;
    addrs.next().map(|sa| sa.ip()).ok_or_else(unresolvable)
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn literal_addresses_skip_lookup() {
        assert_eq!(
            resolve_host("127.0.0.1").await.unwrap(),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
        assert_eq!(
            resolve_host("::1").await.unwrap(),
            "::1".parse::<IpAddr>().unwrap()
        );
    }

    #[tokio::test]
    async fn unresolvable_host_fails_fast() {
        let err = resolve_host("no-such-host.invalid").await.unwrap_err();
        assert_eq!(
            err,
            ScanError::Unresolvable {
                host: "no-such-host.invalid".into()
            }
        );
        assert!(!err.is_invalid_request());
    }

    #[test]
    fn timestamp_is_rfc3339() {
        let ts = now_rfc3339();
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z'));
    }
}
