//! Library crate for portsweep: a bounded-concurrency TCP connect port scanner.
//!
//! The engine is a [`queue::WorkQueue`] of ports drained by a fixed
//! [`pool::WorkerPool`], with open ports collected by an
//! [`aggregator::ResultAggregator`] and the whole run driven by
//! [`scanner::Scanner`].
pub mod aggregator;
pub mod config;
pub mod error;
pub mod pool;
pub mod ports;
pub mod probe;
pub mod queue;
pub mod scanner;
pub mod types;

pub use config::ScanConfig;
pub use error::ScanError;
pub use scanner::{run_scan, run_scan_with_events, Scanner};
pub use types::{PortState, ProbeOutcome, ScanRequest, ScanResult};
