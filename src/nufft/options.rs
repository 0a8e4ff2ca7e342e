//! Operator configuration

use crate::algorithm::spmv::{GroupWidth, LaunchConfig, ReductionStrategy};
use crate::sparse::SparseFormat;

/// Where the interpolation and grid transforms run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionMode {
    /// Sequential host loops: serial scalar CSR products, host FFT
    Host,
    /// Uploaded matrices, kernel launches through the runtime client
    #[default]
    Device,
}

/// Options for a [`NufftOperator`](super::NufftOperator)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NufftOptions {
    /// Execution regime (default: Device)
    pub execution: ExecutionMode,

    /// Storage of the forward (degridding) operator on the device
    /// (default: ELL)
    ///
    /// The adjoint operator is always stored as CSR.
    pub format: SparseFormat,

    /// Row reduction scheme for device launches (default: Vector)
    pub strategy: ReductionStrategy,

    /// Lanes per row for vector launches (default: 32)
    pub group_width: GroupWidth,
}

impl Default for NufftOptions {
    fn default() -> Self {
        Self {
            execution: ExecutionMode::Device,
            format: SparseFormat::Ell,
            strategy: ReductionStrategy::Vector,
            group_width: GroupWidth::default(),
        }
    }
}

impl NufftOptions {
    /// Host execution
    pub fn host() -> Self {
        Self {
            execution: ExecutionMode::Host,
            ..Self::default()
        }
    }

    /// Device execution with the given forward format and launch parameters
    pub fn device(format: SparseFormat, launch: LaunchConfig) -> Self {
        Self {
            execution: ExecutionMode::Device,
            format,
            strategy: launch.strategy,
            group_width: launch.group_width,
        }
    }

    /// Kernel launch parameters
    pub fn launch_config(&self) -> LaunchConfig {
        LaunchConfig {
            strategy: self.strategy,
            group_width: self.group_width,
        }
    }
}
