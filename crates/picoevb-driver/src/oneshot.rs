//! Single-transfer C2H operations behind the dump tools.

use crate::backend::DmaBackend;
use crate::error::{PicoError, Result};
use crate::report::ReportRow;
use crate::timing::{whole_micros, TransferPrimitive, WallClock};
use crate::transfer::{zeroed_buffer, TransferRequest};

/// Bytes and timing of one card read
#[derive(Debug, Clone, PartialEq)]
pub struct CardRead {
    /// Data read from the card
    pub data: Vec<u8>,
    /// `Bytes:… usecs:… MB/s:…` row for the single transfer
    pub row: ReportRow,
}

/// Read `min(card RAM size, cap)` bytes from the start of card RAM in one
/// timed transfer
///
/// # Errors
///
/// Returns error if the card info query, the allocation or the transfer
/// fails.
pub fn timed_card_read(backend: &mut dyn DmaBackend, cap: u64) -> Result<CardRead> {
    let info = backend.card_info()?;
    let size = info.fpga_ram_size.min(cap);
    tracing::info!(
        "Card RAM {} bytes, reading {size} bytes",
        info.fpga_ram_size
    );

    let mut data = zeroed_buffer(size)?;
    let elapsed = {
        let mut clock = WallClock::new(backend);
        clock.perform(&mut TransferRequest::card_to_host(&mut data))?
    };
    let row = ReportRow::new(size, whole_micros(elapsed), 1);

    Ok(CardRead { data, row })
}

/// Read `bytes` from the start of card RAM into 32-bit words
///
/// # Errors
///
/// Returns `InvalidConfig` if `bytes` is not a whole number of words, or
/// the transfer error.
pub fn read_words(backend: &mut dyn DmaBackend, bytes: usize) -> Result<Vec<u32>> {
    if bytes % 4 != 0 {
        return Err(PicoError::invalid_config(format!(
            "{bytes} bytes is not a whole number of 32-bit words"
        )));
    }
    let mut words = vec![0u32; bytes / 4];
    backend.submit(&mut TransferRequest::card_to_host(
        bytemuck::cast_slice_mut(&mut words),
    ))?;
    Ok(words)
}
