//! CPU compute kernels
//!
//! Low-level loops over host slices. Validation happens in the client-level
//! trait implementations; kernels only `debug_assert!` their preconditions.

pub mod fft;
pub mod spmv;

pub use fft::fft_axis_c128;
pub use spmv::{scalar_spmm, serial_spmm, vector_spmm};
