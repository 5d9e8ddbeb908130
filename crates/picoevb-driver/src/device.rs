//! PicoEVB device handle and operations

use std::fs::{File, OpenOptions};
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};
use std::path::{Path, PathBuf};

use picoevb_abi::CardInfo;

use crate::error::{PicoError, Result};
use crate::io::IoctlHandle;
use crate::transfer::TransferRequest;

/// PicoEVB device handle
///
/// An open `/dev/picoevb` node. Transfers block until the driver reports
/// completion.
#[derive(Debug)]
pub struct PicoDevice {
    path: PathBuf,

    /// `None` once `close()` has handed the descriptor back to the kernel
    file: Option<File>,

    io: IoctlHandle,
}

impl PicoDevice {
    /// Open the device node read/write
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` if the node is missing, `DeviceOpen` if it
    /// cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening device {}", path.display());

        if !path.exists() {
            return Err(PicoError::device_not_found(path));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| PicoError::DeviceOpen {
                path: path.to_path_buf(),
                source,
            })?;
        let io = IoctlHandle::new(file.as_raw_fd());

        tracing::info!("Opened device {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            io,
        })
    }

    /// Device path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Query card information
    ///
    /// # Errors
    ///
    /// Returns error if the `CARD_INFO` ioctl fails.
    pub fn card_info(&self) -> Result<CardInfo> {
        let info = self.io.card_info()?;
        tracing::debug!("Card info: fpga_ram_size={}", info.fpga_ram_size);
        Ok(info)
    }

    /// Run one blocking DMA transfer
    ///
    /// # Errors
    ///
    /// Returns error if the driver rejects the transfer.
    pub fn transfer(&mut self, request: &mut TransferRequest<'_>) -> Result<()> {
        let direction = request.direction();
        let params = request.to_dma_params();
        // SAFETY: params carries the address of the buffer borrowed by
        // `request`, which outlives this call; len is that buffer's length.
        unsafe { self.io.dma(direction.ioctl_request(), &params) }
    }

    /// Close the device, reporting errors from `close(2)`
    ///
    /// # Errors
    ///
    /// Returns `DeviceClose` if the kernel reports an error.
    pub fn close(mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        let fd = file.into_raw_fd();
        // SAFETY: fd came from into_raw_fd, so we own it and nothing else
        // closes it.
        let ret = unsafe { libc::close(fd) };
        if ret < 0 {
            return Err(PicoError::DeviceClose {
                path: self.path.clone(),
                source: std::io::Error::last_os_error(),
            });
        }
        tracing::info!("Closed device {}", self.path.display());
        Ok(())
    }

    /// Get raw file descriptor (for advanced use)
    #[must_use]
    pub fn as_raw_fd(&self) -> RawFd {
        self.file.as_ref().map_or(-1, AsRawFd::as_raw_fd)
    }
}

impl Drop for PicoDevice {
    fn drop(&mut self) {
        if self.file.is_some() {
            tracing::info!("Closing device {}", self.path.display());
        }
    }
}
