//! CSR format conversion: conj_transpose, to_ell

use super::CsrMatrix;
use crate::error::{Error, Result};
use crate::sparse::EllMatrix;

impl CsrMatrix {
    /// Conjugate (Hermitian) transpose
    ///
    /// Counting sort by column. Within each output row the entries keep the
    /// order of their source rows, so the result is deterministic.
    pub fn conj_transpose(&self) -> CsrMatrix {
        let [nrows, ncols] = self.shape;
        let nnz = self.values.len();

        let mut row_ptrs = vec![0u32; ncols + 1];
        for &col in &self.col_indices {
            row_ptrs[col as usize + 1] += 1;
        }
        for i in 0..ncols {
            row_ptrs[i + 1] += row_ptrs[i];
        }

        let mut next = row_ptrs.clone();
        let mut col_indices = vec![0u32; nnz];
        let mut values = vec![Default::default(); nnz];
        for row in 0..nrows {
            let start = self.row_ptrs[row] as usize;
            let end = self.row_ptrs[row + 1] as usize;
            for j in start..end {
                let col = self.col_indices[j] as usize;
                let dst = next[col] as usize;
                col_indices[dst] = row as u32;
                values[dst] = self.values[j].conj();
                next[col] += 1;
            }
        }

        CsrMatrix {
            row_ptrs,
            col_indices,
            values,
            shape: [ncols, nrows],
        }
    }

    /// Convert to the fixed-degree ELL layout
    ///
    /// # Errors
    ///
    /// Returns an error if the rows do not all store the same number of entries.
    pub fn to_ell(&self) -> Result<EllMatrix> {
        let degree = self.fixed_degree().ok_or_else(|| {
            Error::invalid_argument("matrix", "ELL layout requires equal row degrees")
        })?;
        EllMatrix::new(
            self.shape,
            degree,
            self.col_indices.clone(),
            self.values.clone(),
        )
    }
}
