//! Kronecker format conversion: to_csr

use super::KroneckerMatrix;
use crate::dtype::Complex128;
use crate::error::Result;
use crate::sparse::CsrMatrix;
use crate::sparse::format::RowSource;

impl KroneckerMatrix {
    /// Expand every row's `prod(jd)` combinations into an explicit CSR matrix
    ///
    /// Entry order within a row follows `mesh_index`.
    pub fn to_csr(&self) -> Result<CsrMatrix> {
        let view = self.view();
        let [nrows, _] = self.shape;
        let degree = self.prod_jd;

        let mut col_indices = Vec::with_capacity(nrows * degree);
        let mut values: Vec<Complex128> = Vec::with_capacity(nrows * degree);
        for row in 0..nrows {
            for j in 0..degree {
                let (col, w) = view.entry(row, j);
                col_indices.push(col as u32);
                values.push(w);
            }
        }
        CsrMatrix::from_fixed_degree(self.shape, degree, col_indices, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::AxisFactor;

    #[test]
    fn test_to_csr_dense_matches_outer_product() {
        // Row weights on a 3 x 3 grid: axis 0 {0: a0, 2: a1}, axis 1 {1: b0}
        let a = [Complex128::new(1.0, 0.5), Complex128::new(-2.0, 0.0)];
        let b = Complex128::new(0.0, 3.0);
        let f0 = AxisFactor {
            width: 2,
            columns: vec![0, 2],
            weights: a.to_vec(),
        };
        let f1 = AxisFactor {
            width: 1,
            columns: vec![1],
            weights: vec![b],
        };
        let kron = KroneckerMatrix::from_axis_factors(&[f0, f1], &[3, 3]).unwrap();
        let dense = kron.to_csr().unwrap().to_dense();

        let mut expected = vec![Complex128::ZERO; 9];
        expected[1] = a[0] * b;
        expected[2 * 3 + 1] = a[1] * b;
        assert_eq!(dense, expected);
    }
}
