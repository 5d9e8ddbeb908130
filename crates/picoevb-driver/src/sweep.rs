//! Throughput sweep benchmark
//!
//! Measures one direction over a doubling series of transfer sizes:
//!
//! ```text
//! step i:  size = min(2^(i+1), max_transfer_size)     i = 0 .. step_count
//!          repeat_count × { fresh request on a zeroed buffer; time it }
//!          row = (size, Σ elapsed_us, size / (Σ elapsed_us / repeat_count))
//! ```
//!
//! The host buffer is allocated per step and freed before the next one.
//! The first failing transfer aborts the whole sweep; no partial report is
//! returned.

use crate::error::{PicoError, Result};
use crate::report::{ReportRow, ThroughputReport};
use crate::timing::{whole_micros, TransferPrimitive};
use crate::transfer::{zeroed_buffer, Direction, TransferRequest};
use picoevb_abi::limits::{SWEEP_MAX_TRANSFER_SIZE, SWEEP_REPEAT_COUNT};
use std::time::Duration;

/// Beyond this many steps every size is the cap.
const MAX_STEP_COUNT: u32 = 64;

/// Sweep parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Largest transfer, in bytes
    pub max_transfer_size: u64,
    /// Transfers timed per step
    pub repeat_count: u32,
    /// Number of steps; `None` = `floor(log2(max_transfer_size))`
    pub step_count: Option<u32>,
    /// End the series at the first step that reaches the cap instead of
    /// repeating the capped size
    pub stop_at_cap: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_transfer_size: SWEEP_MAX_TRANSFER_SIZE,
            repeat_count: SWEEP_REPEAT_COUNT,
            step_count: None,
            stop_at_cap: false,
        }
    }
}

impl SweepConfig {
    /// Set the cap
    #[must_use]
    pub const fn with_max_transfer_size(mut self, bytes: u64) -> Self {
        self.max_transfer_size = bytes;
        self
    }

    /// Set transfers per step
    #[must_use]
    pub const fn with_repeat_count(mut self, repeats: u32) -> Self {
        self.repeat_count = repeats;
        self
    }

    /// Force a step count
    #[must_use]
    pub const fn with_step_count(mut self, steps: u32) -> Self {
        self.step_count = Some(steps);
        self
    }

    /// Stop at the first capped step
    #[must_use]
    pub const fn with_stop_at_cap(mut self, stop: bool) -> Self {
        self.stop_at_cap = stop;
        self
    }

    /// Check the parameters
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero cap, zero repeats or more than 64
    /// steps.
    pub fn validate(&self) -> Result<()> {
        if self.max_transfer_size == 0 {
            return Err(PicoError::invalid_config("max transfer size must be positive"));
        }
        if self.repeat_count == 0 {
            return Err(PicoError::invalid_config("repeat count must be positive"));
        }
        if let Some(steps) = self.step_count {
            if steps > MAX_STEP_COUNT {
                return Err(PicoError::invalid_config(format!(
                    "step count {steps} exceeds {MAX_STEP_COUNT}"
                )));
            }
        }
        Ok(())
    }

    /// Number of steps the series will have before any `stop_at_cap`
    /// truncation
    #[must_use]
    pub fn effective_step_count(&self) -> u32 {
        self.step_count
            .unwrap_or_else(|| self.max_transfer_size.checked_ilog2().unwrap_or(0))
    }

    /// The transfer size of every step, in order
    #[must_use]
    pub fn transfer_sizes(&self) -> Vec<u64> {
        let cap = self.max_transfer_size;
        let steps = self.effective_step_count().min(MAX_STEP_COUNT);

        let mut sizes = Vec::with_capacity(steps as usize);
        for i in 0..steps {
            let size = 1u64.checked_shl(i + 1).map_or(cap, |s| s.min(cap));
            sizes.push(size);
            if self.stop_at_cap && size == cap {
                break;
            }
        }
        sizes
    }
}

/// Running elapsed-time sum for one step
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SampleAccumulator {
    total_us: u64,
    samples: u32,
}

impl SampleAccumulator {
    /// Add one sample, truncated to whole microseconds
    pub fn record(&mut self, elapsed: Duration) {
        self.total_us = self.total_us.saturating_add(whole_micros(elapsed));
        self.samples += 1;
    }

    /// Sum of all samples
    #[must_use]
    pub const fn total_us(&self) -> u64 {
        self.total_us
    }

    /// Samples recorded
    #[must_use]
    pub const fn samples(&self) -> u32 {
        self.samples
    }

    /// Close the step
    #[must_use]
    pub fn finish(self, bytes: u64) -> ReportRow {
        ReportRow::new(bytes, self.total_us, self.samples)
    }
}

/// Throughput sweep over one direction
#[derive(Debug, Clone)]
pub struct ThroughputSweep {
    direction: Direction,
    config: SweepConfig,
}

impl ThroughputSweep {
    /// Sweep `direction` with `config`
    #[must_use]
    pub const fn new(direction: Direction, config: SweepConfig) -> Self {
        Self { direction, config }
    }

    /// Run the sweep
    ///
    /// # Errors
    ///
    /// See [`run_with_progress`](Self::run_with_progress).
    pub fn run<P>(&self, primitive: &mut P) -> Result<ThroughputReport>
    where
        P: TransferPrimitive + ?Sized,
    {
        self.run_with_progress(primitive, |_| {})
    }

    /// Run the sweep, calling `on_step` with each step's size before it
    /// starts
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` before any transfer if the config is rejected
    /// - `AllocationFailed` if a step's buffer cannot be allocated
    /// - `TransferFailed` naming the step's size on the first failed
    ///   transfer
    pub fn run_with_progress<P, F>(&self, primitive: &mut P, mut on_step: F) -> Result<ThroughputReport>
    where
        P: TransferPrimitive + ?Sized,
        F: FnMut(u64),
    {
        self.config.validate()?;
        let sizes = self.config.transfer_sizes();
        let direction = self.direction;

        tracing::info!(
            "{direction} sweep: {} steps up to {} bytes, {} transfers each",
            sizes.len(),
            self.config.max_transfer_size,
            self.config.repeat_count
        );

        let mut rows = Vec::with_capacity(sizes.len());
        for size in sizes {
            on_step(size);

            let mut buffer = zeroed_buffer(size)?;
            let mut samples = SampleAccumulator::default();

            for repeat in 0..self.config.repeat_count {
                let mut request = TransferRequest::new(direction, &mut buffer);
                let elapsed = primitive.perform(&mut request).map_err(|e| {
                    tracing::error!("{direction} transfer {repeat} of {size} bytes failed: {e}");
                    PicoError::transfer_failed(size, direction, e)
                })?;
                samples.record(elapsed);
            }
            drop(buffer);

            let row = samples.finish(size);
            if row.throughput().mb_per_sec().is_none() {
                tracing::warn!("{size} byte {direction} transfers finished below timer resolution");
            }
            tracing::debug!("{row}");
            rows.push(row);
        }

        Ok(ThroughputReport::new(direction, rows))
    }
}
