//! Algorithm contracts for runtime backends
//!
//! Every kernel the transform launches is defined as a trait FIRST, then
//! implemented per backend on the runtime's client type. A backend that
//! skips a contract fails to compile.
//!
//! # Available Algorithm Contracts
//!
//! - [`FftAlgorithms`] - N-D FFT over a subset of axes (Stockham + Bluestein)
//! - [`SpmvAlgorithms`] - Multi-channel sparse products with scalar or
//!   cooperative-group reduction

pub mod fft;
pub mod spmv;

pub use fft::{FftAlgorithms, FftDirection, FftNormalization};
pub use spmv::{DeviceMatrix, GroupWidth, LaunchConfig, ReductionStrategy, SpmvAlgorithms};
