//! Userspace model of the PicoEVB RDMA kernel driver ABI.
//!
//! This crate has **no dependencies** and **no hardware access**. It only
//! describes what the driver expects: ioctl request numbers, the `#[repr(C)]`
//! argument blocks passed through them, device node paths, and the size
//! limits the client tools run with.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ioctl`] | `_IOC` encoding and the driver's request numbers |
//! | [`dma`] | `CardInfo` and `DmaParams` argument blocks, DMA flags |
//! | [`limits`] | Device paths, per-tool transfer caps, sweep defaults |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dma;
pub mod ioctl;
pub mod limits;

pub use dma::{CardInfo, DmaParams};
