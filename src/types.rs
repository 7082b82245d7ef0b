use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use crate::ports::PortRange;

/// A validated, immutable request for one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub host: String,
    pub ports: PortRange,
    pub timeout: Duration,
    pub concurrency: usize,
}

/// Classification of a single connection attempt.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PortState {
    Open,
    /// Refused, timed out, unreachable or any other I/O failure.
    NotOpen,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::Open => write!(f, "open"),
            PortState::NotOpen => write!(f, "not open"),
        }
    }
}

/// Outcome of probing one port.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub port: u16,
    pub state: PortState,
}

impl ProbeOutcome {
    pub fn open(port: u16) -> Self {
        Self {
            port,
            state: PortState::Open,
        }
    }

    pub fn not_open(port: u16) -> Self {
        Self {
            port,
            state: PortState::NotOpen,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

/// Final report of a completed scan.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub host: String,
    pub address: IpAddr,
    pub start_port: u16,
    pub end_port: u16,
    /// Ascending, deduplicated.
    pub open_ports: Vec<u16>,
    pub elapsed: Duration,
    /// Number of probe outcomes produced.
    pub probed: u64,
    /// Number of workers started.
    pub workers: usize,
    pub started_at: String,
}
