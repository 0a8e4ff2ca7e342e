//! Core Kronecker (pELL) implementation: struct, creation, view

use crate::dtype::Complex128;
use crate::error::{Error, Result};

use super::super::format::{RowSource, SparseFormat, SparseStorage};

/// One axis' share of a separable interpolation matrix
///
/// For every row, `width` (grid index along this axis, weight) pairs stored
/// row-major. Grid indices are in `[0, kd[axis])`.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisFactor {
    /// Interpolation width along this axis (Jd)
    pub width: usize,
    /// Per-axis grid index of each entry, `nrows * width` values
    pub columns: Vec<u32>,
    /// Per-axis weight of each entry, `nrows * width` values
    pub weights: Vec<Complex128>,
}

impl AxisFactor {
    /// Number of rows described by this factor
    #[inline]
    pub fn nrows(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.columns.len() / self.width
        }
    }
}

/// Dimension-factored sparse matrix
///
/// Each row keeps `sum(jd)` (column contribution, weight) pairs, axis 0
/// first. A logical entry `j < prod(jd)` picks one slot per axis through
/// `mesh_index`; its column is the sum of the picked contributions and its
/// weight is their product.
///
/// Column contributions are stored pre-multiplied by the axis' row-major
/// grid stride `prod(kd[d+1..])`.
#[derive(Debug, Clone, PartialEq)]
pub struct KroneckerMatrix {
    pub(crate) shape: [usize; 2],
    pub(crate) kd: Vec<usize>,
    pub(crate) jd: Vec<usize>,
    pub(crate) sum_jd: usize,
    pub(crate) prod_jd: usize,
    /// `prod_jd * ndims` slot indices into a row's `sum_jd` block
    pub(crate) mesh_index: Vec<u32>,
    /// `nrows * sum_jd` stride-premultiplied column contributions
    pub(crate) kindx: Vec<u32>,
    /// `nrows * sum_jd` per-axis weights
    pub(crate) udata: Vec<Complex128>,
}

impl KroneckerMatrix {
    /// Build from per-axis factors over an oversampled grid of shape `kd`
    ///
    /// # Errors
    ///
    /// Returns an error if the factor count differs from `kd.len()`, a
    /// factor has zero width or inconsistent lengths, factors disagree on
    /// the row count, a per-axis index is out of range, or the grid does not
    /// fit the `u32` index type.
    pub fn from_axis_factors(factors: &[AxisFactor], kd: &[usize]) -> Result<Self> {
        let ndims = kd.len();
        if ndims == 0 || factors.len() != ndims {
            return Err(Error::invalid_argument(
                "factors",
                format!("expected {} axis factors, got {}", ndims, factors.len()),
            ));
        }

        let ncols = kd
            .iter()
            .try_fold(1usize, |acc, &k| acc.checked_mul(k))
            .filter(|&n| u32::try_from(n).is_ok())
            .ok_or_else(|| {
                Error::invalid_argument("kd", format!("grid {:?} exceeds the u32 index range", kd))
            })?;

        let nrows = factors[0].nrows();
        for (d, f) in factors.iter().enumerate() {
            if f.width == 0 || f.width > kd[d] {
                return Err(Error::invalid_argument(
                    "factors",
                    format!("axis {} width {} not in [1, {}]", d, f.width, kd[d]),
                ));
            }
            if f.columns.len() != nrows * f.width || f.weights.len() != nrows * f.width {
                return Err(Error::shape_mismatch(
                    &[nrows, f.width],
                    &[f.columns.len(), f.weights.len()],
                ));
            }
            if let Some(&k) = f.columns.iter().find(|&&k| k as usize >= kd[d]) {
                return Err(Error::invalid_argument(
                    "factors",
                    format!("axis {} index {} out of range for {}", d, k, kd[d]),
                ));
            }
        }

        let jd: Vec<usize> = factors.iter().map(|f| f.width).collect();
        let sum_jd: usize = jd.iter().sum();
        let prod_jd: usize = jd.iter().product();

        // Slot offset of each axis inside a row block, and grid strides
        let mut offsets = vec![0usize; ndims];
        for d in 1..ndims {
            offsets[d] = offsets[d - 1] + jd[d - 1];
        }
        let mut strides = vec![1usize; ndims];
        for d in (0..ndims.saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * kd[d + 1];
        }

        // Mixed radix, last axis fastest
        let mut mesh_index = vec![0u32; prod_jd * ndims];
        for combo in 0..prod_jd {
            let mut rem = combo;
            for d in (0..ndims).rev() {
                mesh_index[combo * ndims + d] = (offsets[d] + rem % jd[d]) as u32;
                rem /= jd[d];
            }
        }

        let mut kindx = vec![0u32; nrows * sum_jd];
        let mut udata = vec![Complex128::ZERO; nrows * sum_jd];
        for row in 0..nrows {
            let block = row * sum_jd;
            for (d, f) in factors.iter().enumerate() {
                for j in 0..f.width {
                    let src = row * f.width + j;
                    let dst = block + offsets[d] + j;
                    kindx[dst] = (f.columns[src] as usize * strides[d]) as u32;
                    udata[dst] = f.weights[src];
                }
            }
        }

        Ok(Self {
            shape: [nrows, ncols],
            kd: kd.to_vec(),
            jd,
            sum_jd,
            prod_jd,
            mesh_index,
            kindx,
            udata,
        })
    }

    /// Number of axes
    #[inline]
    pub fn ndims(&self) -> usize {
        self.kd.len()
    }

    /// Oversampled grid shape
    pub fn kd(&self) -> &[usize] {
        &self.kd
    }

    /// Per-axis interpolation widths
    pub fn jd(&self) -> &[usize] {
        &self.jd
    }

    /// Logical entries per row, `prod(jd)`
    #[inline]
    pub fn degree(&self) -> usize {
        self.prod_jd
    }

    /// Stored pairs per row, `sum(jd)`
    #[inline]
    pub fn sum_jd(&self) -> usize {
        self.sum_jd
    }

    /// Combination table, `prod(jd) * ndims` slot indices
    pub fn mesh_index(&self) -> &[u32] {
        &self.mesh_index
    }

    /// Stride-premultiplied column contributions, `nrows * sum(jd)`
    pub fn kindx(&self) -> &[u32] {
        &self.kindx
    }

    /// Per-axis weights, `nrows * sum(jd)`
    pub fn udata(&self) -> &[Complex128] {
        &self.udata
    }

    /// Borrow the matrix as a kernel view
    pub fn view(&self) -> KroneckerView<'_> {
        KroneckerView {
            shape: self.shape,
            ndims: self.kd.len(),
            sum_jd: self.sum_jd,
            prod_jd: self.prod_jd,
            mesh_index: &self.mesh_index,
            kindx: &self.kindx,
            udata: &self.udata,
        }
    }
}

impl SparseStorage for KroneckerMatrix {
    fn format(&self) -> SparseFormat {
        SparseFormat::Kronecker
    }

    fn shape(&self) -> [usize; 2] {
        self.shape
    }

    fn nnz(&self) -> usize {
        self.shape[0] * self.prod_jd
    }

    fn memory_usage(&self) -> usize {
        (self.mesh_index.len() + self.kindx.len()) * std::mem::size_of::<u32>()
            + self.udata.len() * std::mem::size_of::<Complex128>()
    }
}

/// Borrowed Kronecker arrays
#[derive(Debug, Clone, Copy)]
pub struct KroneckerView<'a> {
    /// Matrix shape [nrows, ncols]
    pub shape: [usize; 2],
    /// Number of axes
    pub ndims: usize,
    /// Stored pairs per row
    pub sum_jd: usize,
    /// Logical entries per row
    pub prod_jd: usize,
    /// Combination table
    pub mesh_index: &'a [u32],
    /// Column contributions
    pub kindx: &'a [u32],
    /// Per-axis weights
    pub udata: &'a [Complex128],
}

impl RowSource for KroneckerView<'_> {
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
        self.prod_jd
    }

    #[inline]
    fn entry(&self, row: usize, j: usize) -> (usize, Complex128) {
        let block = row * self.sum_jd;
        let combo = &self.mesh_index[j * self.ndims..(j + 1) * self.ndims];
        let mut col = 0usize;
        let mut weight = Complex128::ONE;
        for &slot in combo {
            let idx = block + slot as usize;
            col += self.kindx[idx] as usize;
            weight *= self.udata[idx];
        }
        (col, weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_axis() -> KroneckerMatrix {
        // One row, axis 0 picks {1, 2}, axis 1 picks {3, 0} on a 4 x 5 grid
        let f0 = AxisFactor {
            width: 2,
            columns: vec![1, 2],
            weights: vec![Complex128::new(2.0, 0.0), Complex128::new(0.0, 1.0)],
        };
        let f1 = AxisFactor {
            width: 2,
            columns: vec![3, 0],
            weights: vec![Complex128::new(1.0, 1.0), Complex128::new(3.0, 0.0)],
        };
        KroneckerMatrix::from_axis_factors(&[f0, f1], &[4, 5]).unwrap()
    }

    #[test]
    fn test_mesh_index_last_axis_fastest() {
        let m = two_axis();
        assert_eq!(m.sum_jd(), 4);
        assert_eq!(m.degree(), 4);
        // slots: axis 0 -> {0, 1}, axis 1 -> {2, 3}
        assert_eq!(m.mesh_index(), &[0, 2, 0, 3, 1, 2, 1, 3]);
        // axis 0 stride is 5
        assert_eq!(m.kindx(), &[5, 10, 3, 0]);
    }

    #[test]
    fn test_entry_composes_column_and_weight() {
        let m = two_axis();
        let v = m.view();
        assert_eq!(v.row_degree(0), 4);
        // (1, 3) -> 1*5 + 3
        let (col, w) = v.entry(0, 0);
        assert_eq!(col, 8);
        assert_eq!(w, Complex128::new(2.0, 2.0));
        // (2, 0) -> 10, weight i * 3
        let (col, w) = v.entry(0, 3);
        assert_eq!(col, 10);
        assert_eq!(w, Complex128::new(0.0, 3.0));
        assert_eq!(m.shape(), [1, 20]);
        assert_eq!(m.nnz(), 4);
    }

    #[test]
    fn test_from_axis_factors_validates() {
        let good = AxisFactor {
            width: 1,
            columns: vec![0, 1],
            weights: vec![Complex128::ONE; 2],
        };
        let out_of_range = AxisFactor {
            width: 1,
            columns: vec![0, 4],
            weights: vec![Complex128::ONE; 2],
        };
        let short = AxisFactor {
            width: 1,
            columns: vec![0],
            weights: vec![Complex128::ONE],
        };
        assert!(KroneckerMatrix::from_axis_factors(&[good.clone()], &[4, 4]).is_err());
        assert!(KroneckerMatrix::from_axis_factors(&[good.clone(), out_of_range], &[4, 4]).is_err());
        assert!(KroneckerMatrix::from_axis_factors(&[good.clone(), short], &[4, 4]).is_err());
        assert!(KroneckerMatrix::from_axis_factors(&[good.clone(), good], &[4, 4]).is_ok());
    }
}
