//! Software card backend
//!
//! Implements `DmaBackend` over a host-memory vector standing in for the
//! FPGA RAM. C2H copies from the start of that RAM into the host buffer,
//! H2C copies the host buffer to the start of it, the same addressing the
//! driver uses (card address 0). This enables:
//!
//! 1. **CI without hardware**: the sweep and dump tools run end to end.
//! 2. **Dry runs**: `picoevb --backend software sweep` checks the report
//!    path and gives a memcpy baseline to compare the card against.

use crate::backend::{BackendType, DmaBackend};
use crate::error::{PicoError, Result};
use crate::transfer::TransferRequest;
use picoevb_abi::CardInfo;
use tracing::debug;

/// Software card backend
#[derive(Debug)]
pub struct SoftwareBackend {
    /// Simulated FPGA RAM
    ram: Vec<u8>,
    /// Completed transfers
    transfers: u64,
}

impl SoftwareBackend {
    /// Create a card with `ram_size` bytes of zeroed RAM
    pub fn new(ram_size: usize) -> Self {
        Self {
            ram: vec![0u8; ram_size],
            transfers: 0,
        }
    }

    /// Create a card whose RAM starts with `contents`
    pub fn with_contents(contents: &[u8]) -> Self {
        Self {
            ram: contents.to_vec(),
            transfers: 0,
        }
    }

    /// Simulated card RAM
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// Number of completed transfers
    pub const fn transfers(&self) -> u64 {
        self.transfers
    }

    fn check_range(&self, len: usize) -> Result<()> {
        if len > self.ram.len() {
            return Err(PicoError::OutOfRange {
                offset: 0,
                len: len as u64,
                limit: self.ram.len() as u64,
            });
        }
        Ok(())
    }
}

impl DmaBackend for SoftwareBackend {
    fn card_info(&mut self) -> Result<CardInfo> {
        Ok(CardInfo {
            fpga_ram_size: self.ram.len() as u64,
        })
    }

    fn submit(&mut self, request: &mut TransferRequest<'_>) -> Result<()> {
        let len = request.len();
        self.check_range(len)?;

        if let Some(src) = request.source() {
            self.ram[..len].copy_from_slice(src);
        }
        if let Some(dst) = request.destination_mut() {
            dst.copy_from_slice(&self.ram[..len]);
        }

        self.transfers += 1;
        debug!("software {} transfer of {len} bytes", request.direction());
        Ok(())
    }

    fn shutdown(self: Box<Self>) -> Result<()> {
        debug!("software card released after {} transfers", self.transfers);
        Ok(())
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Software
    }
}
