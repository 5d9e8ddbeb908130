//! Single timed card read with hex dump.
//!
//! Reads the card RAM (capped at 256 KiB) in one C2H transfer, prints the
//! rate line, then a hex + ASCII dump of everything read.
//!
//! Usage:
//!   cargo run --bin rdma_c2h

use anyhow::{Context, Result};
use picoevb_driver::abi::limits::ONESHOT_MAX_TRANSFER_SIZE;
use picoevb_driver::hexdump::HexDump;
use picoevb_driver::oneshot::timed_card_read;
use std::io::Write;

fn main() -> Result<()> {
    picoevb_bench::require_no_args("rdma-c2h");
    picoevb_bench::init_tracing();

    let mut backend = picoevb_bench::open_device()?;
    let read = timed_card_read(backend.as_mut(), ONESHOT_MAX_TRANSFER_SIZE)
        .context("card read failed")?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", read.row)?;
    write!(out, "{}", HexDump(&read.data))?;
    out.flush()?;
    drop(out);

    backend.shutdown().context("close() failed")?;
    Ok(())
}
