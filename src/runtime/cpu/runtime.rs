//! CPU runtime implementation

use super::client::{CpuBuffer, CpuClient};
use super::device::CpuDevice;
use crate::dtype::Element;
use crate::runtime::Runtime;

/// CPU compute runtime
///
/// The "device" is host memory. Kernel launches run cooperative row groups
/// on the rayon pool (feature `rayon`) or serially.
#[derive(Clone, Debug, Default)]
pub struct CpuRuntime;

impl Runtime for CpuRuntime {
    type Device = CpuDevice;
    type Client = CpuClient;
    type Buffer<T: Element> = CpuBuffer<T>;

    fn name() -> &'static str {
        "cpu"
    }

    fn default_device() -> Self::Device {
        CpuDevice::new()
    }

    fn default_client(device: &Self::Device) -> Self::Client {
        CpuClient::new(device.clone())
    }
}
