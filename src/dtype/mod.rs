//! Element types for host arrays and device buffers
//!
//! Every value crossing the host/device boundary implements [`Element`]:
//! complex samples and grid values, real coordinates, and the `u32` index
//! arrays of the sparse interpolation formats.

pub mod complex;
mod element;

pub use complex::Complex128;
pub use element::Element;
