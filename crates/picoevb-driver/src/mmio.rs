//! Memory-mapped access to the card's user BAR
//!
//! The driver exposes BAR0 as `/dev/picoevb_user`. Mapping it gives direct
//! register access without going through the DMA engine, which is what the
//! mmap smoke test exercises.

use crate::error::{PicoError, Result};
use rustix::fs::OFlags;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsFd;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// Memory-mapped user BAR region
///
/// Bounds- and alignment-checked 32-bit access to a shared mapping of the
/// device node. Unmapped on drop.
#[derive(Debug)]
pub struct UserRegion {
    ptr: NonNull<u8>,
    size: usize,
    _file: File,
    path: PathBuf,
}

impl UserRegion {
    /// Map the first `size` bytes of `path` read/write, shared
    ///
    /// The node is opened `O_RDWR | O_SYNC` so stores reach the card
    /// uncached.
    ///
    /// # Errors
    ///
    /// Returns error if the node cannot be opened or mapped.
    pub fn map(path: impl AsRef<Path>, size: usize) -> Result<Self> {
        let path = path.as_ref();
        if size == 0 {
            return Err(PicoError::mmap("mapping size is 0"));
        }

        tracing::debug!("Mapping {} ({size} bytes)", path.display());

        #[allow(clippy::cast_possible_wrap)]
        let sync_flag = OFlags::SYNC.bits() as i32;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(sync_flag)
            .open(path)
            .map_err(|source| PicoError::DeviceOpen {
                path: path.to_path_buf(),
                source,
            })?;

        // SAFETY: fresh mapping (null hint) of a file we keep open for the
        // lifetime of the region; size is non-zero; the mapping is released
        // in Drop with the same size.
        let addr = unsafe {
            mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                0,
            )
        }
        .map_err(|e| PicoError::mmap(format!("{}: {e}", path.display())))?;

        let ptr = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| PicoError::mmap("mmap returned a null mapping"))?;

        tracing::info!("Mapped {} ({size} bytes at {ptr:p})", path.display());

        Ok(Self {
            ptr,
            size,
            _file: file,
            path: path.to_path_buf(),
        })
    }

    fn check_word(&self, offset: usize) -> Result<()> {
        if offset % 4 != 0 || offset.checked_add(4).map_or(true, |end| end > self.size) {
            return Err(PicoError::OutOfRange {
                offset: offset as u64,
                len: 4,
                limit: self.size as u64,
            });
        }
        Ok(())
    }

    /// Read a 32-bit register
    ///
    /// # Errors
    ///
    /// Returns error if `offset` is unaligned or out of bounds.
    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        self.check_word(offset)?;
        // SAFETY: offset is 4-aligned and offset + 4 <= size of the live
        // mapping; volatile because the card can change the value.
        #[allow(clippy::cast_ptr_alignment)]
        let value = unsafe { self.ptr.as_ptr().add(offset).cast::<u32>().read_volatile() };
        tracing::trace!("Read u32 @ {offset:#x} = {value:#x}");
        Ok(value)
    }

    /// Write a 32-bit register
    ///
    /// # Errors
    ///
    /// Returns error if `offset` is unaligned or out of bounds.
    #[allow(clippy::cast_ptr_alignment)]
    pub fn write_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        self.check_word(offset)?;
        tracing::trace!("Write u32 @ {offset:#x} = {value:#x}");
        // SAFETY: offset is 4-aligned and offset + 4 <= size of the live
        // mapping; volatile so every store reaches the card.
        unsafe {
            self.ptr
                .as_ptr()
                .add(offset)
                .cast::<u32>()
                .write_volatile(value);
        }
        Ok(())
    }

    /// Mapped size in bytes
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Mapped device node
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UserRegion {
    fn drop(&mut self) {
        tracing::debug!("Unmapping {}", self.path.display());
        // SAFETY: ptr/size are exactly what mmap returned in map(); Drop runs
        // once and no references into the mapping outlive self.
        unsafe {
            if let Err(e) = munmap(self.ptr.as_ptr().cast(), self.size) {
                tracing::error!("munmap failed during drop: {e}");
            }
        }
    }
}

/// Map `size` bytes of the user BAR and store `pattern` to word 0 twice
///
/// # Errors
///
/// Returns error if the node cannot be opened or mapped.
pub fn mmap_smoke_test(path: impl AsRef<Path>, size: usize, pattern: u32) -> Result<()> {
    let mut region = UserRegion::map(path, size)?;
    region.write_u32(0, pattern)?;
    region.write_u32(0, pattern)?;
    tracing::info!("Stored {pattern:#x} to word 0 of {}", region.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        let err = UserRegion::map("/dev/zero", 0).unwrap_err();
        assert!(matches!(err, PicoError::Mmap { .. }));
    }

    #[test]
    fn missing_node_fails_to_open() {
        let err = UserRegion::map("/dev/picoevb_user-does-not-exist", 1024).unwrap_err();
        assert!(matches!(err, PicoError::DeviceOpen { .. }));
    }

    #[test]
    fn bounds_and_alignment_are_checked() {
        // /dev/zero supports shared read/write mappings.
        let Ok(mut region) = UserRegion::map("/dev/zero", 64) else {
            println!("ℹ️  Skipping test (cannot map /dev/zero)");
            return;
        };
        region.write_u32(60, 0xdead_beef).unwrap();
        assert_eq!(region.read_u32(60).unwrap(), 0xdead_beef);
        assert!(region.read_u32(62).is_err());
        assert!(region.read_u32(64).is_err());
        assert!(region.write_u32(usize::MAX - 3, 0).is_err());
    }
}
