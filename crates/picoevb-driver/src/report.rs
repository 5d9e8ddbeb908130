//! Throughput report rows and their text format.
//!
//! One line per row, `Bytes:<n> usecs:<n> MB/s:<f>`, with the rate printed
//! to six decimals the way C's `%lf` does.

use crate::error::{PicoError, Result};
use crate::transfer::Direction;
use std::fmt;

/// Average rate of one sweep step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Throughput {
    /// Bytes per microsecond (= decimal MB/s)
    MbPerSec(f64),
    /// Total elapsed time was 0 us: the transfers finished below timer
    /// resolution and no finite rate can be given
    BelowTimerResolution,
}

impl Throughput {
    /// Rate in MB/s, `None` for the zero-time sentinel
    #[must_use]
    pub const fn mb_per_sec(self) -> Option<f64> {
        match self {
            Self::MbPerSec(rate) => Some(rate),
            Self::BelowTimerResolution => None,
        }
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MbPerSec(rate) => write!(f, "{rate:.6}"),
            // printf("%lf") of the C tools' x / 0.0
            Self::BelowTimerResolution => write!(f, "inf"),
        }
    }
}

/// One measured transfer size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportRow {
    bytes: u64,
    total_us: u64,
    samples: u32,
    throughput: Throughput,
}

impl ReportRow {
    /// Summarize `samples` transfers of `bytes` that took `total_us` in all
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(bytes: u64, total_us: u64, samples: u32) -> Self {
        let throughput = if total_us == 0 || samples == 0 {
            Throughput::BelowTimerResolution
        } else {
            let average_us = total_us as f64 / f64::from(samples);
            Throughput::MbPerSec(bytes as f64 / average_us)
        };
        Self {
            bytes,
            total_us,
            samples,
            throughput,
        }
    }

    /// Transfer size in bytes
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Summed elapsed time over all samples
    #[must_use]
    pub const fn total_us(&self) -> u64 {
        self.total_us
    }

    /// Number of transfers summed into `total_us`
    #[must_use]
    pub const fn samples(&self) -> u32 {
        self.samples
    }

    /// Average rate, possibly the zero-time sentinel
    #[must_use]
    pub const fn throughput(&self) -> Throughput {
        self.throughput
    }

    /// Average rate in MB/s
    ///
    /// # Errors
    ///
    /// Returns `ZeroElapsed` when the step was too fast to time.
    pub fn throughput_mbps(&self) -> Result<f64> {
        self.throughput
            .mb_per_sec()
            .ok_or(PicoError::ZeroElapsed { bytes: self.bytes })
    }
}

impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bytes:{} usecs:{} MB/s:{}",
            self.bytes, self.total_us, self.throughput
        )
    }
}

/// Result of a complete sweep
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputReport {
    direction: Direction,
    rows: Vec<ReportRow>,
}

impl ThroughputReport {
    /// Build a report from rows in step order
    #[must_use]
    pub fn new(direction: Direction, rows: Vec<ReportRow>) -> Self {
        Self { direction, rows }
    }

    /// Direction that was measured
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Rows in step order
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Highest finite rate across all steps
    #[must_use]
    pub fn peak(&self) -> Option<&ReportRow> {
        self.rows
            .iter()
            .filter(|row| row.throughput.mb_per_sec().is_some())
            .max_by(|a, b| {
                let a = a.throughput.mb_per_sec().unwrap_or(0.0);
                let b = b.throughput.mb_per_sec().unwrap_or(0.0);
                a.total_cmp(&b)
            })
    }
}

impl fmt::Display for ThroughputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
