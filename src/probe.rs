use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time;
use tracing::trace;

use crate::types::ProbeOutcome;

/// A single-attempt connectivity check against one port.
///
/// Implementations must never fail: every unsuccessful attempt is reported
/// as [`PortState::NotOpen`](crate::types::PortState::NotOpen).
pub trait Prober: Send + Sync + 'static {
    fn probe(
        &self,
        addr: IpAddr,
        port: u16,
        timeout: Duration,
    ) -> impl Future<Output = ProbeOutcome> + Send;
}

/// TCP connect prober: a completed three-way handshake means open.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProber;

impl Prober for TcpProber {
    fn probe(
        &self,
        addr: IpAddr,
        port: u16,
        timeout: Duration,
    ) -> impl Future<Output = ProbeOutcome> + Send {
        probe_tcp(SocketAddr::new(addr, port), timeout)
    }
}

/// Attempt one TCP connect bounded by `timeout`. The stream, if any, is
/// dropped (closed) before returning.
pub async fn probe_tcp(addr: SocketAddr, timeout: Duration) -> ProbeOutcome {
    let port = addr.port();
    match time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => ProbeOutcome::open(port),
        Ok(Err(e)) => {
            trace!(%addr, error = %e, "connect failed");
            ProbeOutcome::not_open(port)
        }
        Err(_) => {
            trace!(%addr, "connect timed out");
            ProbeOutcome::not_open(port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn listening_port_is_open() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let out = TcpProber
            .probe(IpAddr::V4(Ipv4Addr::LOCALHOST), port, Duration::from_secs(1))
            .await;
        assert_eq!(out, ProbeOutcome::open(port));
    }

    #[tokio::test]
    async fn closed_port_is_not_open() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let out = probe_tcp(
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port),
            Duration::from_secs(1),
        )
        .await;
        assert!(!out.is_open());
        assert_eq!(out.port, port);
    }
}
