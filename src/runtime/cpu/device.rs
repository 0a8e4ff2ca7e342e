//! Host device that owns uploaded interpolation operators
//!
//! In device mode a [`NufftOperator`](crate::nufft::NufftOperator) copies its
//! CSR/ELL matrices and Kronecker factors into buffers tied to this device;
//! `release` drops them again. The host is the only device, so every
//! `CpuDevice` compares equal by id.

use crate::runtime::Device;

/// The host, addressed as device 0
#[derive(Clone, Debug, Default)]
pub struct CpuDevice {
    id: usize,
}

impl CpuDevice {
    pub fn new() -> Self {
        Self { id: 0 }
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> String {
        "host".to_string()
    }
}
