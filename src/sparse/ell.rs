//! Fixed-degree (ELLPACK) sparse layout
//!
//! Every row stores exactly `degree` entries. Column indices and values are
//! laid out row-major with stride `degree`, so the row offset of an entry is
//! computed rather than looked up.

use crate::dtype::Complex128;
use crate::error::{Error, Result};

use super::csr::CsrMatrix;
use super::format::{RowSource, SparseFormat, SparseStorage};

/// Fixed-degree complex sparse matrix
#[derive(Debug, Clone, PartialEq)]
pub struct EllMatrix {
    pub(crate) shape: [usize; 2],
    pub(crate) degree: usize,
    pub(crate) col_indices: Vec<u32>,
    pub(crate) values: Vec<Complex128>,
}

impl EllMatrix {
    /// Create a fixed-degree matrix from row-major entry arrays
    ///
    /// # Errors
    ///
    /// Returns an error if either array length differs from `nrows * degree`
    /// or a column index is out of range.
    pub fn new(
        shape: [usize; 2],
        degree: usize,
        col_indices: Vec<u32>,
        values: Vec<Complex128>,
    ) -> Result<Self> {
        let [nrows, ncols] = shape;
        let expected = nrows * degree;
        if col_indices.len() != expected {
            return Err(Error::shape_mismatch(
                &[nrows, degree],
                &[col_indices.len()],
            ));
        }
        if values.len() != expected {
            return Err(Error::shape_mismatch(&[nrows, degree], &[values.len()]));
        }
        if let Some(&col) = col_indices.iter().find(|&&c| c as usize >= ncols) {
            return Err(Error::invalid_argument(
                "col_indices",
                format!("column {} out of range for {} columns", col, ncols),
            ));
        }
        Ok(Self {
            shape,
            degree,
            col_indices,
            values,
        })
    }

    /// Entries per row
    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Returns the column indices (row-major, stride `degree`)
    pub fn col_indices(&self) -> &[u32] {
        &self.col_indices
    }

    /// Returns the values (row-major, stride `degree`)
    pub fn values(&self) -> &[Complex128] {
        &self.values
    }

    /// Borrow the matrix as a kernel view
    pub fn view(&self) -> EllView<'_> {
        EllView {
            shape: self.shape,
            degree: self.degree,
            col_indices: &self.col_indices,
            values: &self.values,
        }
    }

    /// Convert back to CSR
    pub fn to_csr(&self) -> Result<CsrMatrix> {
        CsrMatrix::from_fixed_degree(
            self.shape,
            self.degree,
            self.col_indices.clone(),
            self.values.clone(),
        )
    }
}

impl SparseStorage for EllMatrix {
    fn format(&self) -> SparseFormat {
        SparseFormat::Ell
    }

    fn shape(&self) -> [usize; 2] {
        self.shape
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn memory_usage(&self) -> usize {
        self.col_indices.len() * std::mem::size_of::<u32>()
            + self.values.len() * std::mem::size_of::<Complex128>()
    }
}

/// Borrowed ELL arrays
#[derive(Debug, Clone, Copy)]
pub struct EllView<'a> {
    /// Matrix shape [nrows, ncols]
    pub shape: [usize; 2],
    /// Entries per row
    pub degree: usize,
    /// Column indices, stride `degree`
    pub col_indices: &'a [u32],
    /// Values, stride `degree`
    pub values: &'a [Complex128],
}

impl RowSource for EllView<'_> {
    #[inline]
    fn nrows(&self) -> usize {
        self.shape[0]
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.shape[1]
    }

    #[inline]
    fn row_degree(&self, _row: usize) -> usize {
        self.degree
    }

    #[inline]
    fn entry(&self, row: usize, j: usize) -> (usize, Complex128) {
        let idx = row * self.degree + j;
        (self.col_indices[idx] as usize, self.values[idx])
    }
}
