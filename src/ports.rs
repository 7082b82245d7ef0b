use crate::error::ScanError;
use std::fmt;
use std::ops::RangeInclusive;

/// Lowest probeable TCP port.
pub const MIN_PORT: i64 = 1;
/// Highest probeable TCP port.
pub const MAX_PORT: i64 = 65535;

/// An inclusive, validated range of TCP ports (1..=65535, start <= end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    /// Validate raw bounds into a port range.
    ///
    /// Bounds arrive as wide integers so that out-of-range input such as `0` or
    /// `65536` is reported as an invalid range instead of a parse failure.
    pub fn new(start: i64, end: i64) -> Result<Self, ScanError> {
        if start < MIN_PORT || end > MAX_PORT || start > end {
            return Err(ScanError::InvalidRange { start, end });
        }
        Ok(Self {
            start: start as u16,
            end: end as u16,
        })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of ports in the range. Never zero.
    pub fn len(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }

    pub fn iter(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl IntoIterator for PortRange {
    type Item = u16;
    type IntoIter = RangeInclusive<u16>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
