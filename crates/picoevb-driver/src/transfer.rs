//! DMA transfer requests.
//!
//! A [`TransferRequest`] borrows the host buffer for the duration of one
//! transfer and records which end of the transfer it is. The card end is
//! implicit (address 0 in the ioctl block).

use crate::error::{PicoError, Result};
use picoevb_abi::DmaParams;
use std::fmt;

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Card-to-host: card RAM → host buffer
    C2H,
    /// Host-to-card: host buffer → card RAM
    H2C,
}

impl Direction {
    /// ioctl request number for this direction
    #[must_use]
    pub const fn ioctl_request(self) -> u32 {
        match self {
            Self::C2H => picoevb_abi::ioctl::PICOEVB_IOC_C2H_DMA,
            Self::H2C => picoevb_abi::ioctl::PICOEVB_IOC_H2C_DMA,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::C2H => write!(f, "C2H"),
            Self::H2C => write!(f, "H2C"),
        }
    }
}

/// One DMA transfer. Exactly one of `source` / `destination` is a host
/// buffer; the other side is the card.
#[derive(Debug)]
pub struct TransferRequest<'a> {
    source: Option<&'a [u8]>,
    destination: Option<&'a mut [u8]>,
    flags: u32,
}

impl<'a> TransferRequest<'a> {
    /// Bind `buffer` to the host end of a `direction` transfer.
    pub fn new(direction: Direction, buffer: &'a mut [u8]) -> Self {
        match direction {
            Direction::C2H => Self::card_to_host(buffer),
            Direction::H2C => Self::host_to_card(buffer),
        }
    }

    /// Read card RAM into `destination`.
    pub fn card_to_host(destination: &'a mut [u8]) -> Self {
        Self {
            source: None,
            destination: Some(destination),
            flags: 0,
        }
    }

    /// Write `source` into card RAM.
    pub fn host_to_card(source: &'a [u8]) -> Self {
        Self {
            source: Some(source),
            destination: None,
            flags: 0,
        }
    }

    /// Set `DMA_FLAG_*` bits (the tools always use 0).
    #[must_use]
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Direction implied by which end is the host buffer
    pub fn direction(&self) -> Direction {
        if self.destination.is_some() {
            Direction::C2H
        } else {
            Direction::H2C
        }
    }

    /// Host source buffer (H2C only)
    pub fn source(&self) -> Option<&[u8]> {
        self.source
    }

    /// Host destination buffer (C2H only)
    pub fn destination(&self) -> Option<&[u8]> {
        self.destination.as_deref()
    }

    /// Mutable host destination buffer (C2H only)
    pub fn destination_mut(&mut self) -> Option<&mut [u8]> {
        self.destination.as_deref_mut()
    }

    /// Transfer length in bytes
    pub fn len(&self) -> usize {
        self.source
            .map(<[u8]>::len)
            .or_else(|| self.destination.as_ref().map(|d| d.len()))
            .unwrap_or(0)
    }

    /// True for a zero-length transfer
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flag bits
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Build the ioctl argument block. The host side carries the buffer
    /// address, the card side is 0.
    pub fn to_dma_params(&mut self) -> DmaParams {
        let src = self.source.map_or(0, |s| s.as_ptr() as u64);
        let len = self.len() as u64;
        let dst = self
            .destination
            .as_deref_mut()
            .map_or(0, |d| d.as_mut_ptr() as u64);
        DmaParams {
            src,
            dst,
            len,
            flags: self.flags,
            reserved: 0,
        }
    }
}

/// Allocate a zero-filled host buffer, reporting allocation failure
/// instead of aborting.
///
/// # Errors
///
/// Returns `AllocationFailed` if the allocator cannot satisfy the request.
pub fn zeroed_buffer(bytes: u64) -> Result<Vec<u8>> {
    let len = usize::try_from(bytes)
        .map_err(|_| PicoError::invalid_config(format!("{bytes} bytes exceeds address space")))?;
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|source| PicoError::AllocationFailed { bytes, source })?;
    buffer.resize(len, 0);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c2h_binds_destination() {
        let mut buf = vec![0u8; 16];
        let ptr = buf.as_ptr() as u64;
        let mut req = TransferRequest::new(Direction::C2H, &mut buf);
        assert_eq!(req.direction(), Direction::C2H);
        assert!(req.source().is_none());
        assert_eq!(req.len(), 16);

        let params = req.to_dma_params();
        assert_eq!(params.src, 0);
        assert_eq!(params.dst, ptr);
        assert_eq!(params.len, 16);
        assert_eq!(params.flags, 0);
    }

    #[test]
    fn h2c_binds_source() {
        let mut buf = vec![7u8; 8];
        let ptr = buf.as_ptr() as u64;
        let mut req = TransferRequest::new(Direction::H2C, &mut buf);
        assert_eq!(req.direction(), Direction::H2C);
        assert!(req.destination().is_none());

        let params = req.to_dma_params();
        assert_eq!(params.src, ptr);
        assert_eq!(params.dst, 0);
        assert_eq!(params.len, 8);
    }

    #[test]
    fn flags_pass_through() {
        let buf = [0u8; 4];
        let mut req = TransferRequest::host_to_card(&buf)
            .with_flags(picoevb_abi::dma::DMA_FLAG_SRC_IS_CUDA);
        assert_eq!(req.to_dma_params().flags, 1);
    }

    #[test]
    fn zeroed_buffer_is_zeroed() {
        let buf = zeroed_buffer(4096).unwrap();
        assert_eq!(buf.len(), 4096);
        assert!(buf.iter().all(|&b| b == 0));
        assert!(zeroed_buffer(0).unwrap().is_empty());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_buffer_reports_allocation_failure() {
        let err = zeroed_buffer(u64::MAX).unwrap_err();
        assert!(matches!(err, PicoError::AllocationFailed { bytes, .. } if bytes == u64::MAX));
    }

    #[test]
    fn direction_selects_request() {
        assert_eq!(
            Direction::C2H.ioctl_request(),
            picoevb_abi::ioctl::PICOEVB_IOC_C2H_DMA
        );
        assert_eq!(Direction::H2C.to_string(), "H2C");
    }
}
