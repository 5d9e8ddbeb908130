//! Device paths and the size limits each client tool runs with.

/// DMA character device created by the RDMA driver.
pub const DEVICE_PATH: &str = "/dev/picoevb";

/// BAR0 user-register device (mmap-able).
pub const USER_DEVICE_PATH: &str = "/dev/picoevb_user";

/// Largest transfer of the throughput sweeps (8 MiB).
pub const SWEEP_MAX_TRANSFER_SIZE: u64 = 8 * 1024 * 1024;

/// Transfers measured per sweep step.
pub const SWEEP_REPEAT_COUNT: u32 = 100;

/// Cap applied to the card RAM size by the single-shot C2H dump (256 KiB).
pub const ONESHOT_MAX_TRANSFER_SIZE: u64 = 256 * 1024;

/// Fixed size of the word-dump read (128 KiB).
pub const READ_TRANSFER_SIZE: usize = 128 * 1024;

/// Bytes mapped by the BAR smoke test.
pub const MMAP_TEST_SIZE: usize = 1024;

/// Pattern the BAR smoke test writes to word 0.
pub const MMAP_TEST_PATTERN: u32 = 0x00AB_CDEF;

#[cfg(test)]
#[allow(clippy::assertions_on_constants)]
mod tests {
    use super::*;

    #[test]
    fn sweep_cap_is_power_of_two() {
        assert!(SWEEP_MAX_TRANSFER_SIZE.is_power_of_two());
        assert_eq!(SWEEP_MAX_TRANSFER_SIZE.ilog2(), 23);
    }

    #[test]
    fn read_size_is_word_aligned() {
        assert_eq!(READ_TRANSFER_SIZE % 4, 0);
        assert!(ONESHOT_MAX_TRANSFER_SIZE >= READ_TRANSFER_SIZE as u64);
    }
}
