//! Sparse matrix-vector kernel contracts
//!
//! The interpolation engine applies an `M × prod(Kd)` sparse matrix to a
//! channel-interleaved grid. All backends implementing [`SpmvAlgorithms`]
//! MUST follow the same reduction schemes so results agree across formats,
//! strategies and group widths within floating-point tolerance.
//!
//! # Multi-channel row decomposition
//!
//! ```text
//! For each logical row r in 0..(nrows * channels):
//!     m = r / channels          // matrix row (sample)
//!     c = r % channels          // channel
//!     y[r] = sum_j A[m, j].weight * x[A[m, j].col * channels + c]
//! ```
//!
//! # Scalar-per-row
//!
//! One worker per logical row, sequential complex accumulation.
//!
//! # Vector-per-row (cooperative group of width W)
//!
//! ```text
//! lane l in 0..W:
//!     partial[l] = sum over j = l, l + W, l + 2W, ... < degree
//! barrier
//! for bar in W/2, W/4, ..., 1:
//!     lanes l < bar: partial[l] += partial[l + bar]
//!     barrier
//! lane 0 writes partial[0]
//! ```
//!
//! W is a power of two in `1..=256`, fixed at launch configuration time.

use crate::dtype::Complex128;
use crate::error::{Error, Result};
use crate::runtime::{Runtime, RuntimeClient};
use crate::sparse::{CsrMatrix, EllMatrix, KroneckerMatrix, SparseFormat};
use tracing::debug;

/// Largest supported cooperative group width
pub const MAX_GROUP_WIDTH: usize = 256;

/// Row reduction scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReductionStrategy {
    /// One worker per row
    Scalar,
    /// A cooperative group of lanes per row with a tree reduction
    #[default]
    Vector,
}

/// Cooperative group width: a power of two in `1..=256`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupWidth(usize);

impl GroupWidth {
    /// Validate a group width
    pub fn new(width: usize) -> Result<Self> {
        if width == 0 || width > MAX_GROUP_WIDTH || !width.is_power_of_two() {
            return Err(Error::invalid_argument(
                "group_width",
                format!(
                    "must be a power of two in [1, {}], got {}",
                    MAX_GROUP_WIDTH, width
                ),
            ));
        }
        Ok(Self(width))
    }

    /// The number of lanes
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for GroupWidth {
    fn default() -> Self {
        Self(32)
    }
}

/// Kernel launch parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaunchConfig {
    /// Row reduction scheme
    pub strategy: ReductionStrategy,
    /// Lanes per row for [`ReductionStrategy::Vector`]
    pub group_width: GroupWidth,
}

impl LaunchConfig {
    /// Scalar-per-row launch
    pub fn scalar() -> Self {
        Self {
            strategy: ReductionStrategy::Scalar,
            group_width: GroupWidth::default(),
        }
    }

    /// Vector-per-row launch with `group_width` lanes
    pub fn vector(group_width: GroupWidth) -> Self {
        Self {
            strategy: ReductionStrategy::Vector,
            group_width,
        }
    }
}

/// A sparse matrix resident in device buffers
pub enum DeviceMatrix<R: Runtime> {
    /// Row-delimited arrays
    Csr {
        /// [nrows, ncols]
        shape: [usize; 2],
        /// Row pointers
        row_ptrs: R::Buffer<u32>,
        /// Column indices
        col_indices: R::Buffer<u32>,
        /// Values
        values: R::Buffer<Complex128>,
    },
    /// Fixed-degree arrays
    Ell {
        /// [nrows, ncols]
        shape: [usize; 2],
        /// Entries per row
        degree: usize,
        /// Column indices, stride `degree`
        col_indices: R::Buffer<u32>,
        /// Values, stride `degree`
        values: R::Buffer<Complex128>,
    },
    /// Dimension-factored arrays
    Kronecker {
        /// [nrows, ncols]
        shape: [usize; 2],
        /// Number of axes
        ndims: usize,
        /// Stored pairs per row
        sum_jd: usize,
        /// Logical entries per row
        prod_jd: usize,
        /// Combination table
        mesh_index: R::Buffer<u32>,
        /// Column contributions
        kindx: R::Buffer<u32>,
        /// Per-axis weights
        udata: R::Buffer<Complex128>,
    },
}

impl<R: Runtime> DeviceMatrix<R> {
    /// Upload a CSR matrix
    pub fn upload_csr(client: &R::Client, matrix: &CsrMatrix) -> Result<Self> {
        let m = Self::Csr {
            shape: matrix.shape,
            row_ptrs: client.to_device(matrix.row_ptrs())?,
            col_indices: client.to_device(matrix.col_indices())?,
            values: client.to_device(matrix.values())?,
        };
        debug!(runtime = R::name(), format = "CSR", shape = ?matrix.shape, "uploaded matrix");
        Ok(m)
    }

    /// Upload a fixed-degree matrix
    pub fn upload_ell(client: &R::Client, matrix: &EllMatrix) -> Result<Self> {
        let m = Self::Ell {
            shape: matrix.shape,
            degree: matrix.degree(),
            col_indices: client.to_device(matrix.col_indices())?,
            values: client.to_device(matrix.values())?,
        };
        debug!(runtime = R::name(), format = "ELL", shape = ?matrix.shape, "uploaded matrix");
        Ok(m)
    }

    /// Upload a dimension-factored matrix
    pub fn upload_kronecker(client: &R::Client, matrix: &KroneckerMatrix) -> Result<Self> {
        let m = Self::Kronecker {
            shape: matrix.shape,
            ndims: matrix.ndims(),
            sum_jd: matrix.sum_jd(),
            prod_jd: matrix.degree(),
            mesh_index: client.to_device(matrix.mesh_index())?,
            kindx: client.to_device(matrix.kindx())?,
            udata: client.to_device(matrix.udata())?,
        };
        debug!(runtime = R::name(), format = "pELL", shape = ?matrix.shape, "uploaded matrix");
        Ok(m)
    }

    /// Storage format
    pub fn format(&self) -> SparseFormat {
        match self {
            Self::Csr { .. } => SparseFormat::Csr,
            Self::Ell { .. } => SparseFormat::Ell,
            Self::Kronecker { .. } => SparseFormat::Kronecker,
        }
    }

    /// Matrix shape [nrows, ncols]
    pub fn shape(&self) -> [usize; 2] {
        match self {
            Self::Csr { shape, .. } | Self::Ell { shape, .. } | Self::Kronecker { shape, .. } => {
                *shape
            }
        }
    }
}

/// Kernel-launch contract for sparse products
pub trait SpmvAlgorithms<R: Runtime> {
    /// Multi-channel product `Y = A · X`
    ///
    /// `x` is a `ncols × channels` channel-interleaved matrix; the result is
    /// `nrows × channels`, channel fastest. The launch covers
    /// `nrows * channels` logical rows.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `channels == 0`
    /// - `ShapeMismatch` if `x` does not hold `ncols * channels` elements
    fn spmm(
        &self,
        matrix: &DeviceMatrix<R>,
        x: &R::Buffer<Complex128>,
        channels: usize,
        config: LaunchConfig,
    ) -> Result<R::Buffer<Complex128>>;

    /// Single-channel product `y = A · x`
    fn spmv(
        &self,
        matrix: &DeviceMatrix<R>,
        x: &R::Buffer<Complex128>,
        config: LaunchConfig,
    ) -> Result<R::Buffer<Complex128>> {
        self.spmm(matrix, x, 1, config)
    }
}

/// Validate operand sizes shared by all backends
pub fn validate_spmm(shape: [usize; 2], x_len: usize, channels: usize) -> Result<()> {
    if channels == 0 {
        return Err(Error::invalid_argument("channels", "must be at least 1"));
    }
    if x_len != shape[1] * channels {
        return Err(Error::shape_mismatch(&[shape[1], channels], &[x_len]));
    }
    Ok(())
}
