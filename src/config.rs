use std::time::Duration;

use crate::error::ScanError;
use crate::ports::PortRange;
use crate::types::ScanRequest;

/// First port scanned when none is given.
pub const DEFAULT_START_PORT: i64 = 1;
/// Last port scanned when none is given.
pub const DEFAULT_END_PORT: i64 = 1024;
/// Upper bound on simultaneously active probing workers.
pub const DEFAULT_CONCURRENCY: usize = 100;
/// Seconds allowed for each connection attempt.
pub const DEFAULT_TIMEOUT_SECS: f64 = 1.0;

/// Raw, unvalidated scan settings as supplied by the user.
///
/// Built once per invocation and turned into an immutable [`ScanRequest`]
/// by [`ScanConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Host name or literal IPv4/IPv6 address.
    pub host: String,
    /// First port of the inclusive range. Default [`DEFAULT_START_PORT`].
    pub start: i64,
    /// Last port of the inclusive range. Default [`DEFAULT_END_PORT`].
    pub end: i64,
    /// Per-attempt connect timeout in seconds. Default [`DEFAULT_TIMEOUT_SECS`].
    pub timeout_secs: f64,
    /// Configured worker pool size. Default [`DEFAULT_CONCURRENCY`].
    pub concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            start: DEFAULT_START_PORT,
            end: DEFAULT_END_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ScanConfig {
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Check every field and produce a request the coordinator can run.
    /// Does no network activity.
    pub fn validate(&self) -> Result<ScanRequest, ScanError> {
        let ports = PortRange::new(self.start, self.end)?;
        let timeout = Duration::try_from_secs_f64(self.timeout_secs)
            .ok()
            .filter(|t| !t.is_zero())
            .ok_or(ScanError::InvalidTimeout(self.timeout_secs))?;
        if self.concurrency == 0 {
            return Err(ScanError::InvalidConcurrency(self.concurrency));
        }
        Ok(ScanRequest {
            host: self.host.clone(),
            ports,
            timeout,
            concurrency: self.concurrency,
        })
    }
}
