//! ioctl request numbers for `/dev/picoevb`.
//!
//! Numbers follow the generic Linux `_IOC` layout used on x86_64 and
//! aarch64 (the Jetson hosts the card usually sits in):
//!
//! ```text
//!  31 30 | 29 ........ 16 | 15 ..... 8 | 7 ...... 0
//!   dir  |      size      |    type    |     nr
//! ```

use crate::dma::{CardInfo, DmaParams};

/// Driver ioctl magic (`'P'`).
pub const PICOEVB_IOC_MAGIC: u8 = b'P';

/// Userspace writes, kernel reads.
pub const IOC_WRITE: u32 = 1;
/// Kernel writes, userspace reads.
pub const IOC_READ: u32 = 2;

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = 8;
const IOC_SIZESHIFT: u32 = 16;
const IOC_DIRSHIFT: u32 = 30;
const IOC_SIZEMASK: usize = (1 << 14) - 1;

/// Encode an ioctl request number (`_IOC(dir, type, nr, size)`).
///
/// Sizes that do not fit the 14-bit field are truncated, as the C macro does.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn ioc(dir: u32, ty: u8, nr: u8, size: usize) -> u32 {
    (dir << IOC_DIRSHIFT)
        | (((size & IOC_SIZEMASK) as u32) << IOC_SIZESHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
}

/// `_IOW(type, nr, T)`
#[must_use]
pub const fn iow<T>(ty: u8, nr: u8) -> u32 {
    ioc(IOC_WRITE, ty, nr, std::mem::size_of::<T>())
}

/// Query card information (FPGA RAM size).
///
/// The driver declares this `_IOW` even though it fills the struct in.
pub const PICOEVB_IOC_CARD_INFO: u32 = iow::<CardInfo>(PICOEVB_IOC_MAGIC, 0);

/// Card-to-host DMA: `dst` is a host address, `src` is 0.
pub const PICOEVB_IOC_C2H_DMA: u32 = iow::<DmaParams>(PICOEVB_IOC_MAGIC, 5);

/// Host-to-card DMA: `src` is a host address, `dst` is 0.
pub const PICOEVB_IOC_H2C_DMA: u32 = iow::<DmaParams>(PICOEVB_IOC_MAGIC, 6);

/// Decoded fields of a request number, for trace logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IocFields {
    /// Direction bits (`IOC_READ` / `IOC_WRITE`).
    pub dir: u32,
    /// Magic / type byte.
    pub ty: u8,
    /// Command number.
    pub nr: u8,
    /// Argument size in bytes.
    pub size: usize,
}

/// Split a request number back into its fields.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn decode(request: u32) -> IocFields {
    IocFields {
        dir: request >> IOC_DIRSHIFT,
        ty: (request >> IOC_TYPESHIFT) as u8,
        nr: (request >> IOC_NRSHIFT) as u8,
        size: ((request >> IOC_SIZESHIFT) as usize) & IOC_SIZEMASK,
    }
}

/// Human-readable name of a known request, for error messages.
#[must_use]
pub const fn request_name(request: u32) -> &'static str {
    match request {
        PICOEVB_IOC_CARD_INFO => "CARD_INFO",
        PICOEVB_IOC_C2H_DMA => "C2H_DMA",
        PICOEVB_IOC_H2C_DMA => "H2C_DMA",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_numbers_match_linux_encoding() {
        assert_eq!(PICOEVB_IOC_CARD_INFO, 0x4008_5000);
        assert_eq!(PICOEVB_IOC_C2H_DMA, 0x4020_5005);
        assert_eq!(PICOEVB_IOC_H2C_DMA, 0x4020_5006);
    }

    #[test]
    fn decode_inverts_encode() {
        let f = decode(PICOEVB_IOC_H2C_DMA);
        assert_eq!(f.dir, IOC_WRITE);
        assert_eq!(f.ty, b'P');
        assert_eq!(f.nr, 6);
        assert_eq!(f.size, std::mem::size_of::<DmaParams>());

        let f = decode(ioc(IOC_READ | IOC_WRITE, b'x', 9, 8));
        assert_eq!(f.dir, IOC_READ | IOC_WRITE);
        assert_eq!((f.ty, f.nr, f.size), (b'x', 9, 8));
    }

    #[test]
    fn names() {
        assert_eq!(request_name(PICOEVB_IOC_C2H_DMA), "C2H_DMA");
        assert_eq!(request_name(0), "UNKNOWN");
    }
}
