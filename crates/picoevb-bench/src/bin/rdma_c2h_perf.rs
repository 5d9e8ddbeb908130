//! Card-to-host DMA throughput sweep.
//!
//! Reads 2 B … 8 MiB from card RAM, 100 transfers per size, and prints
//! `Bytes:<n> usecs:<total> MB/s:<avg>` per size.
//!
//! Usage:
//!   cargo run --bin rdma_c2h_perf

use anyhow::Result;
use picoevb_driver::Direction;

fn main() -> Result<()> {
    picoevb_bench::require_no_args("rdma-c2h-perf");
    picoevb_bench::init_tracing();
    picoevb_bench::run_perf(Direction::C2H)
}
