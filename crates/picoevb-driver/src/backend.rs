//! Backend abstraction for DMA engines
//!
//! Provides one interface over the kernel driver and the in-memory
//! software card, so the benchmark and dump tools run against either.

use crate::error::Result;
use crate::transfer::TransferRequest;
use picoevb_abi::CardInfo;
use std::fmt::Debug;

/// DMA backend trait - unified interface for the kernel driver and the
/// software card
pub trait DmaBackend: Debug {
    /// Query card information
    ///
    /// # Errors
    ///
    /// Returns error if the card cannot be queried.
    fn card_info(&mut self) -> Result<CardInfo>;

    /// Run one blocking transfer
    ///
    /// Returns once the data has landed at the destination.
    ///
    /// # Errors
    ///
    /// Returns error if the transfer fails.
    fn submit(&mut self, request: &mut TransferRequest<'_>) -> Result<()>;

    /// Release the backend, surfacing teardown errors
    ///
    /// # Errors
    ///
    /// Returns error if teardown fails (e.g. `close(2)` on the device).
    fn shutdown(self: Box<Self>) -> Result<()>;

    /// Get backend type for debugging
    fn backend_type(&self) -> BackendType;
}

/// Backend type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Kernel driver (/dev/picoevb ioctls)
    Kernel,

    /// Software card - host memory standing in for FPGA RAM
    Software,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kernel => write!(f, "Kernel"),
            Self::Software => write!(f, "Software"),
        }
    }
}

/// Backend selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendSelection {
    /// Kernel driver if the device node opens, software card otherwise
    Auto,

    /// Force kernel driver
    Kernel,

    /// Force software card (no hardware required)
    Software,
}

/// Select a backend
///
/// A software card gets `software_ram_size` bytes of RAM.
///
/// # Errors
///
/// Returns error if the requested backend cannot be initialized.
pub fn select_backend(
    selection: BackendSelection,
    device_path: &str,
    software_ram_size: usize,
) -> Result<Box<dyn DmaBackend>> {
    use crate::backends::kernel::KernelBackend;
    use crate::backends::software::SoftwareBackend;

    match selection {
        BackendSelection::Auto => match KernelBackend::open(device_path) {
            Ok(backend) => {
                tracing::info!("Using kernel backend for {device_path}");
                Ok(Box::new(backend))
            }
            Err(e) => {
                tracing::info!("Kernel backend unavailable ({e}), using software card");
                Ok(Box::new(SoftwareBackend::new(software_ram_size)))
            }
        },

        BackendSelection::Kernel => {
            KernelBackend::open(device_path).map(|b| Box::new(b) as Box<dyn DmaBackend>)
        }

        BackendSelection::Software => Ok(Box::new(SoftwareBackend::new(software_ram_size))),
    }
}
