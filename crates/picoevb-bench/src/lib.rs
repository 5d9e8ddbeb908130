//! Shared plumbing for the per-tool binaries.
//!
//! Each tool takes no arguments, logs to stderr (`RUST_LOG`, default
//! `warn`) and prints its results to stdout.

use anyhow::{Context, Result};
use picoevb_driver::abi::limits::DEVICE_PATH;
use picoevb_driver::{DmaBackend, Direction, KernelBackend, SweepConfig, ThroughputSweep, WallClock};
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();
}

/// Filter for the given `RUST_LOG` value; `warn` when unset, empty or
/// unparsable.
pub fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

/// Exit with a usage message if any argument was given.
pub fn require_no_args(tool: &str) {
    if std::env::args().len() != 1 {
        eprintln!("usage: {tool}");
        std::process::exit(1);
    }
}

/// Open the DMA device node.
///
/// # Errors
///
/// Returns error if the node is missing or cannot be opened.
pub fn open_device() -> Result<Box<dyn DmaBackend>> {
    let backend = KernelBackend::open(DEVICE_PATH).context("open() failed")?;
    Ok(Box::new(backend))
}

/// Run the default throughput sweep in `direction` against `/dev/picoevb`
/// and print the report.
///
/// # Errors
///
/// Returns error on the first failed open, allocation, transfer or close.
pub fn run_perf(direction: Direction) -> Result<()> {
    let mut backend = open_device()?;

    let sweep = ThroughputSweep::new(direction, SweepConfig::default());
    let report = sweep
        .run_with_progress(&mut WallClock::new(backend.as_mut()), |size| {
            println!("Test transfer size = {size}");
        })
        .context("ioctl(DMA) failed")?;

    print!("{report}");

    backend.shutdown().context("close() failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn explicit_level_is_honoured() {
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(
            log_filter(Some("picoevb_driver=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn falls_back_to_warn() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(Some("  ")).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            log_filter(Some("picoevb_driver=loud")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }
}
