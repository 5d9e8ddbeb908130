//! Error types for PicoEVB driver operations

use crate::transfer::Direction;
use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for PicoEVB operations
pub type Result<T> = std::result::Result<T, PicoError>;

/// Errors that can occur while talking to the PicoEVB driver
#[derive(Debug, Error)]
pub enum PicoError {
    /// Device node does not exist
    #[error("Device not found: {path}")]
    DeviceNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// Device node exists but could not be opened
    #[error("open() failed for {path}: {source}")]
    DeviceOpen {
        /// Device path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Closing the device reported an error
    #[error("close() failed for {path}: {source}")]
    DeviceClose {
        /// Device path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The driver rejected an ioctl
    #[error("ioctl({request}) failed: {source}")]
    Ioctl {
        /// Request name (e.g. `C2H_DMA`)
        request: &'static str,
        /// errno reported by the kernel
        source: std::io::Error,
    },

    /// Host buffer allocation failed
    #[error("Failed to allocate {bytes} byte host buffer")]
    AllocationFailed {
        /// Requested size
        bytes: u64,
        /// Allocator error
        source: TryReserveError,
    },

    /// A DMA transfer failed; the sweep stops here
    #[error("{direction} transfer of {bytes} bytes failed: {source}")]
    TransferFailed {
        /// Size of the failing transfer
        bytes: u64,
        /// Transfer direction
        direction: Direction,
        /// What the transfer primitive reported
        source: Box<PicoError>,
    },

    /// Elapsed time measured as zero, so throughput is undefined
    #[error("Elapsed time for {bytes} byte transfers measured as 0 us")]
    ZeroElapsed {
        /// Transfer size of the affected step
        bytes: u64,
    },

    /// Access outside a card RAM or mapped region
    #[error("Access of {len} bytes at {offset:#x} exceeds {limit} bytes")]
    OutOfRange {
        /// Start of the access
        offset: u64,
        /// Access length
        len: u64,
        /// Size of the RAM or region
        limit: u64,
    },

    /// Rejected sweep or tool configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong
        reason: String,
    },

    /// Mapping device memory failed
    #[error("mmap failed: {reason}")]
    Mmap {
        /// Reason for failure
        reason: String,
    },
}

impl PicoError {
    /// Create a device not found error
    pub fn device_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DeviceNotFound { path: path.into() }
    }

    /// Create an ioctl error from the current `errno`
    pub fn ioctl_last_os_error(request: &'static str) -> Self {
        Self::Ioctl {
            request,
            source: std::io::Error::last_os_error(),
        }
    }

    /// Wrap a primitive failure with the step that hit it
    pub fn transfer_failed(bytes: u64, direction: Direction, cause: PicoError) -> Self {
        Self::TransferFailed {
            bytes,
            direction,
            source: Box::new(cause),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an mmap error
    pub fn mmap(reason: impl Into<String>) -> Self {
        Self::Mmap {
            reason: reason.into(),
        }
    }
}
