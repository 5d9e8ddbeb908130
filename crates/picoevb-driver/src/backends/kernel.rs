//! Kernel backend
//!
//! Wraps [`PicoDevice`] to conform to the `DmaBackend` trait.

use crate::backend::{BackendType, DmaBackend};
use crate::device::PicoDevice;
use crate::error::Result;
use crate::transfer::TransferRequest;
use picoevb_abi::CardInfo;
use std::path::Path;

/// Kernel driver backend
///
/// Uses the `/dev/picoevb` device node via the RDMA kernel module
#[derive(Debug)]
pub struct KernelBackend {
    device: PicoDevice,
}

impl KernelBackend {
    /// Open the device node
    ///
    /// # Errors
    ///
    /// Returns error if the node is missing or cannot be opened.
    pub fn open(device_path: impl AsRef<Path>) -> Result<Self> {
        let device = PicoDevice::open(device_path)?;
        Ok(Self { device })
    }
}

impl DmaBackend for KernelBackend {
    fn card_info(&mut self) -> Result<CardInfo> {
        self.device.card_info()
    }

    fn submit(&mut self, request: &mut TransferRequest<'_>) -> Result<()> {
        self.device.transfer(request)
    }

    fn shutdown(self: Box<Self>) -> Result<()> {
        self.device.close()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Kernel
    }
}
