//! Throughput sweep behaviour against fake transfer primitives

use picoevb_driver::abi::DmaParams;
use picoevb_driver::{
    Direction, PicoError, Result, SoftwareBackend, SweepConfig, Throughput, ThroughputSweep,
    TransferPrimitive, TransferRequest, WallClock,
};
use std::time::Duration;

/// What the fake saw for one request
#[derive(Debug, Clone)]
struct Seen {
    direction: Direction,
    len: usize,
    has_source: bool,
    has_destination: bool,
    params: DmaParams,
    host_was_zeroed: bool,
}

/// Answers every transfer with a fixed elapsed time, optionally failing on
/// the n-th call (0-based)
#[derive(Debug, Default)]
struct FixedClock {
    elapsed: Duration,
    fail_at: Option<usize>,
    scribble: bool,
    calls: usize,
    seen: Vec<Seen>,
}

impl FixedClock {
    fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            ..Self::default()
        }
    }
}

impl TransferPrimitive for FixedClock {
    fn perform(&mut self, request: &mut TransferRequest<'_>) -> Result<Duration> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_at == Some(call) {
            return Err(PicoError::Ioctl {
                request: "C2H_DMA",
                source: std::io::Error::other("injected DMA failure"),
            });
        }

        let host_was_zeroed = request
            .source()
            .or_else(|| request.destination())
            .is_some_and(|b| b.iter().all(|&x| x == 0));
        let params = request.to_dma_params();
        self.seen.push(Seen {
            direction: request.direction(),
            len: request.len(),
            has_source: request.source().is_some(),
            has_destination: request.destination().is_some(),
            params,
            host_was_zeroed,
        });

        if self.scribble {
            if let Some(dst) = request.destination_mut() {
                dst.fill(0xA5);
            }
        }
        Ok(self.elapsed)
    }
}

fn config(max: u64, repeats: u32) -> SweepConfig {
    SweepConfig::default()
        .with_max_transfer_size(max)
        .with_repeat_count(repeats)
}

#[test]
fn averaging_with_fixed_elapsed_time() {
    let t_us = 40;
    let repeats = 7;
    let mut clock = FixedClock::new(Duration::from_micros(t_us));

    let report = ThroughputSweep::new(Direction::C2H, config(1024, repeats))
        .run(&mut clock)
        .unwrap();

    assert_eq!(report.rows().len(), 10);
    for row in report.rows() {
        assert_eq!(row.total_us(), u64::from(repeats) * t_us);
        assert_eq!(row.samples(), repeats);
        #[allow(clippy::cast_precision_loss)]
        let expected = row.bytes() as f64 / t_us as f64;
        assert_eq!(row.throughput(), Throughput::MbPerSec(expected));
    }
    assert_eq!(clock.calls, 10 * repeats as usize);
}

#[test]
fn rows_follow_step_order() {
    let mut clock = FixedClock::new(Duration::from_micros(1));
    let report = ThroughputSweep::new(Direction::H2C, config(64, 2))
        .run(&mut clock)
        .unwrap();
    let sizes: Vec<u64> = report.rows().iter().map(|r| r.bytes()).collect();
    assert_eq!(sizes, [2, 4, 8, 16, 32, 64]);
    assert_eq!(report.direction(), Direction::H2C);
}

#[test]
fn first_failure_aborts_the_sweep() {
    let repeats = 5;
    let mut clock = FixedClock::new(Duration::from_micros(3));
    // step 2 (8 bytes), repeat 3
    clock.fail_at = Some(2 * repeats + 2);

    let err = ThroughputSweep::new(Direction::C2H, config(1024, repeats as u32))
        .run(&mut clock)
        .unwrap_err();

    match err {
        PicoError::TransferFailed {
            bytes,
            direction,
            source,
        } => {
            assert_eq!(bytes, 8);
            assert_eq!(direction, Direction::C2H);
            assert!(matches!(*source, PicoError::Ioctl { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(clock.calls, 2 * repeats + 3, "no transfers after the failure");
    assert!(clock.seen.iter().all(|s| s.len <= 8));
}

#[test]
fn zero_elapsed_time_yields_sentinel() {
    let mut clock = FixedClock::new(Duration::ZERO);
    let report = ThroughputSweep::new(Direction::C2H, config(16, 100))
        .run(&mut clock)
        .unwrap();

    for row in report.rows() {
        assert_eq!(row.total_us(), 0);
        assert_eq!(row.throughput(), Throughput::BelowTimerResolution);
        assert!(row.throughput_mbps().is_err());
        assert!(row.to_string().ends_with("MB/s:inf"));
    }
    assert!(report.peak().is_none());
}

#[test]
fn sub_microsecond_samples_truncate_to_zero() {
    let mut clock = FixedClock::new(Duration::from_nanos(900));
    let report = ThroughputSweep::new(Direction::H2C, config(4, 10))
        .run(&mut clock)
        .unwrap();
    assert!(report
        .rows()
        .iter()
        .all(|r| r.throughput() == Throughput::BelowTimerResolution));
}

#[test]
fn c2h_requests_target_the_host_buffer() {
    let mut clock = FixedClock::new(Duration::from_micros(1));
    ThroughputSweep::new(Direction::C2H, config(256, 3))
        .run(&mut clock)
        .unwrap();

    assert!(!clock.seen.is_empty());
    for seen in &clock.seen {
        assert_eq!(seen.direction, Direction::C2H);
        assert!(!seen.has_source);
        assert!(seen.has_destination);
        assert_eq!(seen.params.src, 0);
        assert_ne!(seen.params.dst, 0);
        assert_eq!(seen.params.len, seen.len as u64);
        assert_eq!(seen.params.flags, 0);
    }
}

#[test]
fn h2c_requests_read_the_host_buffer() {
    let mut clock = FixedClock::new(Duration::from_micros(1));
    ThroughputSweep::new(Direction::H2C, config(256, 3))
        .run(&mut clock)
        .unwrap();

    for seen in &clock.seen {
        assert_eq!(seen.direction, Direction::H2C);
        assert!(seen.has_source);
        assert!(!seen.has_destination);
        assert_ne!(seen.params.src, 0);
        assert_eq!(seen.params.dst, 0);
        assert!(seen.host_was_zeroed);
    }
}

#[test]
fn each_step_starts_with_a_fresh_zeroed_buffer() {
    let repeats = 4;
    let mut clock = FixedClock::new(Duration::from_micros(1));
    clock.scribble = true;
    ThroughputSweep::new(Direction::C2H, config(128, repeats))
        .run(&mut clock)
        .unwrap();

    for (i, seen) in clock.seen.iter().enumerate() {
        let first_of_step = i % repeats as usize == 0;
        assert_eq!(seen.host_was_zeroed, first_of_step, "request {i}");
    }
}

#[test]
fn progress_hook_sees_every_step() {
    let mut clock = FixedClock::new(Duration::from_micros(2));
    let mut announced = Vec::new();
    let report = ThroughputSweep::new(Direction::C2H, config(32, 1))
        .run_with_progress(&mut clock, |size| announced.push(size))
        .unwrap();
    assert_eq!(announced, [2, 4, 8, 16, 32]);
    assert_eq!(report.rows().len(), announced.len());
}

#[test]
fn invalid_config_runs_no_transfers() {
    let mut clock = FixedClock::new(Duration::from_micros(1));
    let err = ThroughputSweep::new(Direction::C2H, config(1024, 0))
        .run(&mut clock)
        .unwrap_err();
    assert!(matches!(err, PicoError::InvalidConfig { .. }));
    assert_eq!(clock.calls, 0);
}

#[test]
fn capped_tail_is_measured_unless_stopped() {
    let mut clock = FixedClock::new(Duration::from_micros(1));
    let base = config(100, 2).with_step_count(8);

    let report = ThroughputSweep::new(Direction::C2H, base.clone())
        .run(&mut clock)
        .unwrap();
    let sizes: Vec<u64> = report.rows().iter().map(|r| r.bytes()).collect();
    assert_eq!(sizes, [2, 4, 8, 16, 32, 64, 100, 100]);

    let report = ThroughputSweep::new(Direction::C2H, base.with_stop_at_cap(true))
        .run(&mut clock)
        .unwrap();
    assert_eq!(report.rows().last().map(|r| r.bytes()), Some(100));
    assert_eq!(report.rows().len(), 7);
}

#[test]
fn software_card_sweep_end_to_end() {
    let mut card = SoftwareBackend::new(4096);
    let report = ThroughputSweep::new(Direction::H2C, config(4096, 3))
        .run(&mut WallClock::new(&mut card))
        .unwrap();

    assert_eq!(report.rows().len(), 12);
    assert_eq!(card.transfers(), 36);
    for line in report.to_string().lines() {
        assert!(line.starts_with("Bytes:"), "{line}");
        assert!(line.contains(" usecs:"));
        assert!(line.contains(" MB/s:"));
    }
}

#[test]
fn software_card_too_small_fails_with_size() {
    let mut card = SoftwareBackend::new(100);
    let err = ThroughputSweep::new(Direction::C2H, config(1024, 2))
        .run(&mut WallClock::new(&mut card))
        .unwrap_err();
    assert!(matches!(
        err,
        PicoError::TransferFailed { bytes: 128, direction: Direction::C2H, .. }
    ));
}
