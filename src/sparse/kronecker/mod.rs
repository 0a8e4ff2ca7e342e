//! Dimension-factored (Kronecker / pELL) format

mod conversion;
mod core;

pub use core::{AxisFactor, KroneckerMatrix, KroneckerView};
