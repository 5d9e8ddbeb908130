//! DMA backend implementations
//!
//! Two backends available:
//! - **Kernel**: ioctls on `/dev/picoevb` (requires the RDMA kernel module)
//! - **Software**: host memory standing in for the FPGA RAM, for CI and
//!   dry runs of the tools

pub mod kernel;
pub mod software;

pub use kernel::KernelBackend;
pub use software::SoftwareBackend;
