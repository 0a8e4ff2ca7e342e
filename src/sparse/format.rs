//! Sparse format definitions and traits

use crate::dtype::Complex128;

/// Storage format of the interpolation operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SparseFormat {
    /// Compressed Sparse Row (row-delimited)
    ///
    /// Row offsets + column indices + values. Degree may vary per row.
    /// Reference format, and the storage of the adjoint (gridding) operator.
    /// Storage: O(2 * nnz + nrows + 1)
    Csr,

    /// Fixed-degree ELLPACK layout
    ///
    /// Column indices and values row-major with stride `degree`; no offset
    /// indirection.
    /// Storage: O(2 * nrows * degree)
    #[default]
    Ell,

    /// Dimension-factored (Kronecker / pELL) layout
    ///
    /// Per row only `sum(Jd)` per-axis (column contribution, weight) pairs;
    /// the `prod(Jd)` entries are synthesized at multiply time.
    /// Storage: O(2 * nrows * sum(Jd) + prod(Jd) * ndims)
    Kronecker,
}

impl SparseFormat {
    /// Returns true if every row stores the same number of entries
    #[inline]
    pub fn is_fixed_degree(&self) -> bool {
        matches!(self, SparseFormat::Ell | SparseFormat::Kronecker)
    }

    /// Returns the format name as a string
    pub fn name(&self) -> &'static str {
        match self {
            SparseFormat::Csr => "CSR",
            SparseFormat::Ell => "ELL",
            SparseFormat::Kronecker => "pELL",
        }
    }
}

impl std::fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trait for sparse storage backends
///
/// Common interface for all interpolation-matrix formats.
pub trait SparseStorage {
    /// Returns the sparse format type
    fn format(&self) -> SparseFormat;

    /// Returns the shape as [nrows, ncols]
    fn shape(&self) -> [usize; 2];

    /// Returns the number of rows
    #[inline]
    fn nrows(&self) -> usize {
        self.shape()[0]
    }

    /// Returns the number of columns
    #[inline]
    fn ncols(&self) -> usize {
        self.shape()[1]
    }

    /// Returns the number of structurally stored (logical) entries
    fn nnz(&self) -> usize;

    /// Returns the memory usage in bytes (approximate)
    fn memory_usage(&self) -> usize;
}

/// Row-wise entry access used by the SpMV kernels
///
/// Every format exposes the same logical matrix through this trait; kernels
/// are written once against it. `entry(row, j)` returns the `j`-th stored
/// entry of `row` for `j < row_degree(row)`.
pub trait RowSource: Sync {
    /// Number of rows
    fn nrows(&self) -> usize;

    /// Number of columns
    fn ncols(&self) -> usize;

    /// Number of stored entries in `row`
    fn row_degree(&self, row: usize) -> usize;

    /// The `j`-th stored entry of `row` as (column, weight)
    fn entry(&self, row: usize, j: usize) -> (usize, Complex128);
}
