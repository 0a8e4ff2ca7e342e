//! # nufft
//!
//! **Non-uniform fast Fourier transforms with multi-format sparse interpolation.**
//!
//! nufft maps images on a regular grid to irregular frequency samples and
//! back. The transform is split into three stages: apodization scaling, an
//! oversampled grid FFT, and sparse interpolation between the grid and the
//! samples.
//!
//! ## Features
//!
//! - **Sparse formats**: CSR, ELL and separable Kronecker (pELL) storage of
//!   the interpolation operator
//! - **Reduction kernels**: scalar (one worker per row) and vector
//!   (cooperative lane groups with a tree reduction) sparse products
//! - **Channels**: batched transforms over a trailing channel axis, with
//!   channel-profile broadcast and combine
//! - **Toeplitz**: precomputed circulant embedding of the normal operator
//! - **Execution modes**: host loops or uploaded device buffers behind the
//!   [`Runtime`](runtime::Runtime) abstraction
//!
//! ## Quick Start
//!
//! ```rust
//! use nufft::prelude::*;
//!
//! let samples = vec![0.5, -0.25, 1.0, 2.0];
//! let plan = Plan::new(&samples, &[8, 8], &[16, 16], &[4, 4], &PlanOptions::default())?;
//! let op = NufftOperator::new(plan, NufftOptions::host())?;
//!
//! let y = op.forward(&Tensor::ones(&[8, 8]))?;
//! assert_eq!(y.shape(), &[2]);
//! # Ok::<(), nufft::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): multi-threaded kernel launches and FFT lines

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod algorithm;
pub mod dtype;
pub mod error;
pub mod nufft;
pub mod runtime;
pub mod sparse;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::fft::{FftAlgorithms, FftDirection, FftNormalization};
    pub use crate::algorithm::spmv::{
        DeviceMatrix, GroupWidth, LaunchConfig, ReductionStrategy, SpmvAlgorithms,
    };
    pub use crate::dtype::Complex128;
    pub use crate::error::{Error, Result};
    pub use crate::nufft::{
        ExecutionMode, KaiserBesselDesigner, KernelDesign, KernelDesigner, NufftOperator,
        NufftOptions, Plan, PlanOptions, ToeplitzKernel,
    };
    pub use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::sparse::{CsrMatrix, EllMatrix, KroneckerMatrix, SparseFormat, SparseStorage};
    pub use crate::tensor::Tensor;
}
