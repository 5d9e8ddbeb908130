//! BAR mmap smoke test.
//!
//! Maps the first 1 KiB of `/dev/picoevb_user` and stores `0xABCDEF` to
//! word 0 twice. Success is silent.
//!
//! Usage:
//!   cargo run --bin test_mmap

use anyhow::{Context, Result};
use picoevb_driver::abi::limits::{MMAP_TEST_PATTERN, MMAP_TEST_SIZE, USER_DEVICE_PATH};
use picoevb_driver::mmio::mmap_smoke_test;

fn main() -> Result<()> {
    picoevb_bench::require_no_args("test-mmap");
    picoevb_bench::init_tracing();

    mmap_smoke_test(USER_DEVICE_PATH, MMAP_TEST_SIZE, MMAP_TEST_PATTERN)
        .context("mmap failed")?;
    Ok(())
}
