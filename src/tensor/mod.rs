//! Host-resident complex arrays
//!
//! `Tensor` is the currency of every public transform: a contiguous,
//! row-major complex array with an explicit shape. Arrays that carry a
//! channel axis put it last, so channels are interleaved in memory.

mod core;

pub use core::Tensor;
