//! Timed transfer primitive
//!
//! The sweep only sees "run this request, tell me how long it took".
//! [`WallClock`] answers that for a real backend; tests answer it with
//! fixed durations.

use crate::backend::DmaBackend;
use crate::error::Result;
use crate::transfer::TransferRequest;
use std::time::{Duration, Instant};

/// One timed, blocking DMA transfer
pub trait TransferPrimitive {
    /// Run `request` and return the elapsed wall-clock time
    ///
    /// # Errors
    ///
    /// Returns error if the transfer fails.
    fn perform(&mut self, request: &mut TransferRequest<'_>) -> Result<Duration>;
}

/// Times `DmaBackend::submit` with a monotonic clock
#[derive(Debug)]
pub struct WallClock<'a, B: DmaBackend + ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: DmaBackend + ?Sized> WallClock<'a, B> {
    /// Time transfers on `backend`
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }
}

impl<B: DmaBackend + ?Sized> TransferPrimitive for WallClock<'_, B> {
    fn perform(&mut self, request: &mut TransferRequest<'_>) -> Result<Duration> {
        let start = Instant::now();
        self.backend.submit(request)?;
        Ok(start.elapsed())
    }
}

/// Whole microseconds in `elapsed`, truncated like the per-sample
/// `tv_nsec / 1000` arithmetic of a `timespec` delta
#[must_use]
pub fn whole_micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}
