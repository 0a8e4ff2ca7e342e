//! CPU client and buffer implementation

use super::device::CpuDevice;
use super::runtime::CpuRuntime;
use crate::dtype::Element;
use crate::error::Result;
use crate::runtime::RuntimeClient;
use tracing::trace;

/// CPU client for operation dispatch
#[derive(Clone, Debug, Default)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
}

impl CpuClient {
    /// Create a new CPU client
    pub fn new(device: CpuDevice) -> Self {
        Self { device }
    }
}

/// Host-memory buffer standing in for device memory
#[derive(Clone, Debug, PartialEq)]
pub struct CpuBuffer<T: Element> {
    data: Vec<T>,
}

impl<T: Element> CpuBuffer<T> {
    /// Wrap owned elements
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Zero-initialized buffer of `len` elements
    pub fn zeroed(len: usize) -> Self {
        Self {
            data: vec![T::default(); len],
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size in bytes
    #[inline]
    pub fn size_bytes(&self) -> usize {
        bytemuck::cast_slice::<T, u8>(&self.data).len()
    }

    /// Borrow the elements
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutably borrow the elements
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) {
        // CPU launches complete before returning
    }

    fn to_device<T: Element>(&self, data: &[T]) -> Result<CpuBuffer<T>> {
        let buffer = CpuBuffer::from_vec(data.to_vec());
        trace!(
            elem = T::NAME,
            bytes = buffer.size_bytes(),
            "host -> device copy"
        );
        Ok(buffer)
    }

    fn from_device<T: Element>(&self, buffer: &CpuBuffer<T>) -> Result<Vec<T>> {
        trace!(
            elem = T::NAME,
            bytes = buffer.size_bytes(),
            "device -> host copy"
        );
        Ok(buffer.as_slice().to_vec())
    }
}
