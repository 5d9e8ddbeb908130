//! Rust client library for the PicoEVB RDMA kernel driver.
//!
//! The driver exposes the FPGA's DMA engine as blocking ioctls on
//! `/dev/picoevb`: one call moves a host buffer to card RAM (H2C) or card
//! RAM into a host buffer (C2H). This crate wraps those calls and builds
//! the measurement tools on top of them.
//!
//! # Backends
//!
//! ```text
//! KernelBackend   — /dev/picoevb ioctls (requires the RDMA kernel module)
//! SoftwareBackend — host memory standing in for card RAM (CI, dry runs)
//! ```
//!
//! # Throughput sweep
//!
//! ```no_run
//! use picoevb_driver::{Direction, KernelBackend, SweepConfig, ThroughputSweep, WallClock};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut backend = KernelBackend::open("/dev/picoevb")?;
//! let sweep = ThroughputSweep::new(Direction::C2H, SweepConfig::default());
//! let report = sweep.run(&mut WallClock::new(&mut backend))?;
//! print!("{report}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod backend;
pub mod backends;
mod device;
mod error;
pub mod hexdump;
mod io;
pub mod mmio;
pub mod oneshot;
mod report;
mod sweep;
mod timing;
mod transfer;

/// Driver ABI constants (re-exported from picoevb-abi).
pub mod abi {
    pub use picoevb_abi::*;
}

pub use backend::{select_backend, BackendSelection, BackendType, DmaBackend};
pub use backends::{KernelBackend, SoftwareBackend};
pub use device::PicoDevice;
pub use error::{PicoError, Result};
pub use report::{ReportRow, Throughput, ThroughputReport};
pub use sweep::{SampleAccumulator, SweepConfig, ThroughputSweep};
pub use timing::{whole_micros, TransferPrimitive, WallClock};
pub use transfer::{zeroed_buffer, Direction, TransferRequest};
