//! Host-to-card DMA throughput sweep.
//!
//! Writes 2 B … 8 MiB of zeroes to card RAM, 100 transfers per size, and
//! prints `Bytes:<n> usecs:<total> MB/s:<avg>` per size.
//!
//! Usage:
//!   cargo run --bin rdma_h2c_perf

use anyhow::Result;
use picoevb_driver::Direction;

fn main() -> Result<()> {
    picoevb_bench::require_no_args("rdma-h2c-perf");
    picoevb_bench::init_tracing();
    picoevb_bench::run_perf(Direction::H2C)
}
