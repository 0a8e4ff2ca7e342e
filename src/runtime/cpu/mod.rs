//! CPU runtime implementation
//!
//! The CPU runtime treats host memory as device memory. Uploads copy into
//! owned [`CpuBuffer`]s, kernel launches run on the rayon pool when the
//! `rayon` feature is enabled, and `synchronize` is a no-op because every
//! launch has finished when it returns.

mod client;
mod device;
mod fft;
mod helpers;
pub(crate) mod kernels;
mod runtime;
mod spmv;

pub use client::{CpuBuffer, CpuClient};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
