use thiserror::Error;

/// Errors surfaced by the scan engine before any probing starts.
///
/// Per-probe failures never show up here: they are folded into
/// [`PortState::NotOpen`](crate::types::PortState::NotOpen) by the prober.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Invalid port range {start}-{end}: use values between 1 and 65535 with start <= end")]
    InvalidRange { start: i64, end: i64 },
    #[error("Invalid timeout {0}s: must be a positive number of seconds")]
    InvalidTimeout(f64),
    #[error("Invalid concurrency {0}: at least one worker is required")]
    InvalidConcurrency(usize),
    #[error("Could not resolve host: {host}")]
    Unresolvable { host: String },
}

impl ScanError {
    /// True for errors caused by a malformed request rather than the network.
    pub fn is_invalid_request(&self) -> bool {
        !matches!(self, ScanError::Unresolvable { .. })
    }
}
