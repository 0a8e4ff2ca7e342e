//! Runtime backends for transform execution
//!
//! This module defines the `Runtime` trait and the CPU implementation.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a specific compute unit)
//! ├── Client (uploads, downloads, launches kernels, synchronizes)
//! └── Buffer<T> (device-resident array of plain-old-data elements)
//! ```
//!
//! Kernel launch contracts live in [`crate::algorithm`] and are implemented
//! on the runtime's client type.

pub mod cpu;

use crate::dtype::Element;
use crate::error::Result;

/// Core trait for compute backends
///
/// `Runtime` abstracts over compute devices. It uses static dispatch via
/// generics, so an operator is monomorphized for its backend.
///
/// # Associated Types
///
/// - `Device`: Identifies a specific compute unit
/// - `Client`: Handles transfers, kernel dispatch and synchronization
/// - `Buffer<T>`: Device-resident array owned by the caller
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device identifier type
    type Device: Device;

    /// Client for dispatching operations
    type Client: RuntimeClient<Self>;

    /// Device buffer holding `T` elements
    type Buffer<T: Element>: Send + Sync;

    /// Human-readable name of this runtime
    fn name() -> &'static str;

    /// Get the default device
    fn default_device() -> Self::Device;

    /// Get the default client for a device
    fn default_client(device: &Self::Device) -> Self::Client;
}

/// Trait for device identification
pub trait Device: Clone + Send + Sync + 'static {
    /// Unique identifier for this device
    fn id(&self) -> usize;

    /// Check if two devices are the same
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Human-readable name
    fn name(&self) -> String {
        format!("Device({})", self.id())
    }
}

/// Trait for runtime clients that handle transfers and dispatch
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// Synchronize: wait for all pending operations to complete
    fn synchronize(&self);

    /// Copy host data into a new device buffer
    fn to_device<T: Element>(&self, data: &[T]) -> Result<R::Buffer<T>>;

    /// Copy a device buffer back to host memory
    fn from_device<T: Element>(&self, buffer: &R::Buffer<T>) -> Result<Vec<T>>;
}
