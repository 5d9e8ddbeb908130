//! Read 128 KiB of card RAM and print it as 32-bit words.
//!
//! Usage:
//!   cargo run --bin rdma_read

use anyhow::{Context, Result};
use picoevb_driver::abi::limits::READ_TRANSFER_SIZE;
use picoevb_driver::hexdump::WordDump;
use picoevb_driver::oneshot::read_words;

fn main() -> Result<()> {
    picoevb_bench::require_no_args("rdma-read");
    picoevb_bench::init_tracing();

    let mut backend = picoevb_bench::open_device()?;
    let words = read_words(backend.as_mut(), READ_TRANSFER_SIZE).context("ioctl(DMA) failed")?;
    print!("{}", WordDump(&words));

    backend.shutdown().context("close() failed")?;
    Ok(())
}
