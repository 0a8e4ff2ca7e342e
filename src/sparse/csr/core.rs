//! Core CSR implementation: struct, creation, getters

use crate::dtype::Complex128;
use crate::error::{Error, Result};

use super::super::format::{RowSource, SparseFormat, SparseStorage};

/// CSR (Compressed Sparse Row) complex sparse matrix
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    pub(crate) row_ptrs: Vec<u32>,
    pub(crate) col_indices: Vec<u32>,
    pub(crate) values: Vec<Complex128>,
    pub(crate) shape: [usize; 2],
}

impl CsrMatrix {
    /// Create a new CSR matrix from components
    ///
    /// # Arguments
    ///
    /// * `row_ptrs` - Row pointers (length: nrows + 1)
    /// * `col_indices` - Column indices for each stored entry
    /// * `values` - Values at each position
    /// * `shape` - Matrix shape [nrows, ncols]
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - row_ptrs length != nrows + 1, or row_ptrs is not a non-decreasing
    ///   partition of the entries starting at 0
    /// - col_indices and values have different lengths
    /// - a column index is out of range
    pub fn new(
        row_ptrs: Vec<u32>,
        col_indices: Vec<u32>,
        values: Vec<Complex128>,
        shape: [usize; 2],
    ) -> Result<Self> {
        let [nrows, ncols] = shape;
        let nnz = values.len();

        if row_ptrs.len() != nrows + 1 {
            return Err(Error::ShapeMismatch {
                expected: vec![nrows + 1],
                got: vec![row_ptrs.len()],
            });
        }
        if col_indices.len() != nnz {
            return Err(Error::ShapeMismatch {
                expected: vec![nnz],
                got: vec![col_indices.len()],
            });
        }
        if row_ptrs[0] != 0 || row_ptrs[nrows] as usize != nnz {
            return Err(Error::invalid_argument(
                "row_ptrs",
                format!(
                    "must span [0, {}], got [{}, {}]",
                    nnz, row_ptrs[0], row_ptrs[nrows]
                ),
            ));
        }
        if row_ptrs.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::invalid_argument(
                "row_ptrs",
                "must be non-decreasing",
            ));
        }
        if let Some(&col) = col_indices.iter().find(|&&c| c as usize >= ncols) {
            return Err(Error::invalid_argument(
                "col_indices",
                format!("column {} out of range for {} columns", col, ncols),
            ));
        }

        Ok(Self {
            row_ptrs,
            col_indices,
            values,
            shape,
        })
    }

    /// Create a CSR matrix whose rows all store exactly `degree` entries
    ///
    /// `col_indices` and `values` are laid out row-major with stride `degree`.
    pub fn from_fixed_degree(
        shape: [usize; 2],
        degree: usize,
        col_indices: Vec<u32>,
        values: Vec<Complex128>,
    ) -> Result<Self> {
        let nnz = shape[0] * degree;
        if u32::try_from(nnz).is_err() {
            return Err(Error::invalid_argument(
                "degree",
                format!("{} stored entries exceed the u32 index range", nnz),
            ));
        }
        let row_ptrs = (0..=shape[0]).map(|row| (row * degree) as u32).collect();
        Self::new(row_ptrs, col_indices, values, shape)
    }

    /// Returns the row pointers
    pub fn row_ptrs(&self) -> &[u32] {
        &self.row_ptrs
    }

    /// Returns the column indices
    pub fn col_indices(&self) -> &[u32] {
        &self.col_indices
    }

    /// Returns the stored values
    pub fn values(&self) -> &[Complex128] {
        &self.values
    }

    /// Returns the number of stored entries in a specific row
    #[inline]
    pub fn row_nnz(&self, row: usize) -> usize {
        (self.row_ptrs[row + 1] - self.row_ptrs[row]) as usize
    }

    /// Returns the common row degree if every row stores the same number of entries
    pub fn fixed_degree(&self) -> Option<usize> {
        let nrows = self.shape[0];
        if nrows == 0 {
            return Some(0);
        }
        let degree = self.row_nnz(0);
        (1..nrows)
            .all(|row| self.row_nnz(row) == degree)
            .then_some(degree)
    }

    /// Borrow the matrix as a kernel view
    pub fn view(&self) -> CsrView<'_> {
        CsrView {
            shape: self.shape,
            row_ptrs: &self.row_ptrs,
            col_indices: &self.col_indices,
            values: &self.values,
        }
    }

    /// Expand to a dense row-major matrix (duplicate entries are summed)
    pub fn to_dense(&self) -> Vec<Complex128> {
        let [nrows, ncols] = self.shape;
        let mut dense = vec![Complex128::ZERO; nrows * ncols];
        for row in 0..nrows {
            let start = self.row_ptrs[row] as usize;
            let end = self.row_ptrs[row + 1] as usize;
            for j in start..end {
                dense[row * ncols + self.col_indices[j] as usize] += self.values[j];
            }
        }
        dense
    }
}

impl SparseStorage for CsrMatrix {
    fn format(&self) -> SparseFormat {
        SparseFormat::Csr
    }

    fn shape(&self) -> [usize; 2] {
        self.shape
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn memory_usage(&self) -> usize {
        self.row_ptrs.len() * std::mem::size_of::<u32>()
            + self.col_indices.len() * std::mem::size_of::<u32>()
            + self.values.len() * std::mem::size_of::<Complex128>()
    }
}

/// Borrowed CSR arrays, on host or in a CPU device buffer
#[derive(Debug, Clone, Copy)]
pub struct CsrView<'a> {
    /// Matrix shape [nrows, ncols]
    pub shape: [usize; 2],
    /// Row pointers (length: nrows + 1)
    pub row_ptrs: &'a [u32],
    /// Column index of each stored entry
    pub col_indices: &'a [u32],
    /// Value of each stored entry
    pub values: &'a [Complex128],
}

impl RowSource for CsrView<'_> {
    #[inline]
    fn nrows(&self) -> usize {
        self.shape[0]
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.shape[1]
    }

    #[inline]
    fn row_degree(&self, row: usize) -> usize {
        (self.row_ptrs[row + 1] - self.row_ptrs[row]) as usize
    }

    #[inline]
    fn entry(&self, row: usize, j: usize) -> (usize, Complex128) {
        let idx = self.row_ptrs[row] as usize + j;
        (self.col_indices[idx] as usize, self.values[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex128 {
        Complex128::from(re)
    }

    #[test]
    fn test_csr_new_validates() {
        // [1, 0, 2]
        // [0, 0, 3]
        let ok = CsrMatrix::new(vec![0, 2, 3], vec![0, 2, 2], vec![c(1.0), c(2.0), c(3.0)], [2, 3]);
        assert!(ok.is_ok());

        let bad_ptrs = CsrMatrix::new(vec![0, 2], vec![0, 2], vec![c(1.0), c(2.0)], [2, 3]);
        assert!(matches!(bad_ptrs, Err(Error::ShapeMismatch { .. })));

        let bad_col = CsrMatrix::new(vec![0, 1, 2], vec![0, 3], vec![c(1.0), c(2.0)], [2, 3]);
        assert!(matches!(
            bad_col,
            Err(Error::InvalidArgument {
                arg: "col_indices",
                ..
            })
        ));

        let decreasing = CsrMatrix::new(vec![0, 2, 1], vec![0, 1], vec![c(1.0), c(2.0)], [2, 3]);
        assert!(decreasing.is_err());
    }

    #[test]
    fn test_csr_fixed_degree() {
        let fixed =
            CsrMatrix::from_fixed_degree([2, 4], 2, vec![0, 1, 2, 3], vec![c(1.0); 4]).unwrap();
        assert_eq!(fixed.fixed_degree(), Some(2));
        assert_eq!(fixed.row_ptrs(), &[0, 2, 4]);

        let ragged =
            CsrMatrix::new(vec![0, 1, 3], vec![0, 1, 2], vec![c(1.0); 3], [2, 4]).unwrap();
        assert_eq!(ragged.fixed_degree(), None);
    }

    #[test]
    fn test_csr_view_entries() {
        let m = CsrMatrix::new(vec![0, 2, 3], vec![0, 2, 1], vec![c(1.0), c(2.0), c(3.0)], [2, 3])
            .unwrap();
        let v = m.view();
        assert_eq!(v.row_degree(0), 2);
        assert_eq!(v.row_degree(1), 1);
        assert_eq!(v.entry(0, 1), (2, c(2.0)));
        assert_eq!(v.entry(1, 0), (1, c(3.0)));
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.format(), SparseFormat::Csr);
    }
}
