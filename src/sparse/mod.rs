//! Sparse interpolation-matrix formats
//!
//! The interpolation operator is an `M × prod(Kd)` complex matrix with a
//! small, fixed number of entries per row. It is kept in three layouts that
//! represent the same logical matrix:
//!
//! - **CSR** (row-delimited): row pointers + column indices + values. The
//!   reference layout and the storage of the adjoint (gridding) operator,
//!   whose rows have varying degree.
//!
//! - **ELL** (fixed-degree): column indices + values with a constant row
//!   stride. No pointer indirection.
//!
//! - **Kronecker** (pELL): per row only the per-axis factors are stored and
//!   the `prod(Jd)` entries are composed at multiply time. Column
//!   contributions are pre-multiplied by the grid stride of their axis, so
//!   an entry's column is the plain sum of its contributions.
//!
//! Kernels never see the concrete types; they iterate rows through the
//! [`RowSource`] trait implemented by each format's borrowed view.
//!
//! ```
//! use nufft::dtype::Complex128;
//! use nufft::sparse::{CsrMatrix, SparseStorage};
//!
//! let csr = CsrMatrix::from_fixed_degree(
//!     [2, 4],
//!     2,
//!     vec![0, 1, 2, 3],
//!     vec![Complex128::ONE; 4],
//! )?;
//! let ell = csr.to_ell()?;
//! assert_eq!(ell.nnz(), csr.nnz());
//! assert_eq!(csr.conj_transpose().shape(), [4, 2]);
//! # Ok::<(), nufft::error::Error>(())
//! ```

mod csr;
mod ell;
mod format;
mod kronecker;

pub use csr::{CsrMatrix, CsrView};
pub use ell::{EllMatrix, EllView};
pub use format::{RowSource, SparseFormat, SparseStorage};
pub use kronecker::{AxisFactor, KroneckerMatrix, KroneckerView};
