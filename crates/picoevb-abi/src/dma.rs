//! ioctl argument blocks.
//!
//! Layouts match the driver's `struct picoevb_rdma_card_info` and
//! `struct picoevb_rdma_{c2h,h2c}_dma` (the two DMA structs are identical).

/// Source address is a CUDA (GPU) virtual address.
pub const DMA_FLAG_SRC_IS_CUDA: u32 = 1 << 0;

/// Destination address is a CUDA (GPU) virtual address.
pub const DMA_FLAG_DST_IS_CUDA: u32 = 1 << 1;

/// Result of `PICOEVB_IOC_CARD_INFO`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardInfo {
    /// Size of the FPGA-side RAM in bytes.
    pub fpga_ram_size: u64,
}

/// Argument of `PICOEVB_IOC_C2H_DMA` / `PICOEVB_IOC_H2C_DMA`.
///
/// Exactly one of `src` / `dst` carries a host address; the other is 0
/// and denotes the card RAM.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DmaParams {
    /// Source address (0 = card RAM).
    pub src: u64,
    /// Destination address (0 = card RAM).
    pub dst: u64,
    /// Transfer length in bytes.
    pub len: u64,
    /// `DMA_FLAG_*` bits.
    pub flags: u32,
    /// Tail padding the C compiler inserts; always 0.
    pub reserved: u32,
}
