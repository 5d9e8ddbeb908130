//! Raw ioctl calls against the driver
//!
//! rustix has no typed wrapper for a vendor driver's ioctls, so these go
//! through `libc::ioctl` with the request numbers from `picoevb-abi`.

use crate::error::{PicoError, Result};
use picoevb_abi::dma::{DMA_FLAG_DST_IS_CUDA, DMA_FLAG_SRC_IS_CUDA};
use picoevb_abi::ioctl::{decode, request_name, PICOEVB_IOC_CARD_INFO};
use picoevb_abi::{CardInfo, DmaParams};
use std::os::unix::io::RawFd;

/// ioctl handler
///
/// Wraps a file descriptor for driver ioctls.
/// Does not own the file descriptor - the caller retains ownership.
#[derive(Debug)]
pub struct IoctlHandle {
    fd: RawFd,
}

impl IoctlHandle {
    /// Create new ioctl handler for a file descriptor
    #[must_use]
    pub const fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    /// `PICOEVB_IOC_CARD_INFO`
    ///
    /// # Errors
    ///
    /// Returns error if the driver rejects the request.
    pub fn card_info(&self) -> Result<CardInfo> {
        let mut info = CardInfo::default();
        // SAFETY: CARD_INFO takes a pointer to a CardInfo the driver fills in.
        // fd is valid for the lifetime of this IoctlHandle; info is repr(C) and
        // lives across the call.
        let ret = unsafe {
            libc::ioctl(
                self.fd,
                PICOEVB_IOC_CARD_INFO as _,
                std::ptr::addr_of_mut!(info),
            )
        };
        if ret != 0 {
            return Err(PicoError::ioctl_last_os_error("CARD_INFO"));
        }
        Ok(info)
    }

    /// Issue a blocking DMA ioctl (`C2H_DMA` or `H2C_DMA`).
    ///
    /// # Errors
    ///
    /// Returns error if the driver reports a failed transfer.
    ///
    /// # Safety
    ///
    /// The host address in `params` must point to at least `params.len`
    /// bytes that stay valid (and, for C2H, writable) until the call returns.
    pub unsafe fn dma(&self, request: u32, params: &DmaParams) -> Result<()> {
        let fields = decode(request);
        tracing::trace!(
            "ioctl({}, nr={} size={}) src={:#x}{} dst={:#x}{} len={}",
            request_name(request),
            fields.nr,
            fields.size,
            params.src,
            cuda_tag(params.flags & DMA_FLAG_SRC_IS_CUDA),
            params.dst,
            cuda_tag(params.flags & DMA_FLAG_DST_IS_CUDA),
            params.len,
        );
        // SAFETY: the driver reads the DmaParams block and DMAs to/from the
        // host address it carries; the caller guarantees that address.
        let ret = unsafe { libc::ioctl(self.fd, request as _, std::ptr::from_ref(params)) };
        if ret < 0 {
            return Err(PicoError::ioctl_last_os_error(request_name(request)));
        }
        Ok(())
    }
}

const fn cuda_tag(flag_bit: u32) -> &'static str {
    if flag_bit == 0 {
        ""
    } else {
        "(cuda)"
    }
}
