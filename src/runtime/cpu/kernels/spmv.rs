//! Sparse product kernels over any [`RowSource`]
//!
//! Three launch shapes:
//! - [`serial_spmm`]: strictly sequential scalar loop (host execution)
//! - [`scalar_spmm`]: one worker per logical row
//! - [`vector_spmm`]: a cooperative group of `W` lanes per logical row
//!
//! Logical row `r` covers matrix row `r / channels` and channel
//! `r % channels`; the input is read at `col * channels + c` and the output
//! written at `r`.

use crate::dtype::Complex128;
use crate::sparse::RowSource;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Rows handed to one rayon task
#[cfg(feature = "rayon")]
const MIN_ROWS_PER_TASK: usize = 64;

/// Scalar reduction of one logical row
#[inline]
fn scalar_row<S: RowSource>(a: &S, x: &[Complex128], channels: usize, r: usize) -> Complex128 {
    let m = r / channels;
    let c = r % channels;
    let mut acc = Complex128::ZERO;
    for j in 0..a.row_degree(m) {
        let (col, w) = a.entry(m, j);
        acc += w * x[col * channels + c];
    }
    acc
}

/// Cooperative reduction of one logical row by a group of `W` lanes
///
/// Lanes run in lockstep: the first loop is the strided accumulation phase,
/// each pass of the second loop is one tree step between barriers.
#[inline]
fn vector_row<S: RowSource, const W: usize>(
    a: &S,
    x: &[Complex128],
    channels: usize,
    r: usize,
) -> Complex128 {
    let m = r / channels;
    let c = r % channels;
    let degree = a.row_degree(m);

    let mut partial = [Complex128::ZERO; W];
    for (lane, slot) in partial.iter_mut().enumerate() {
        let mut j = lane;
        while j < degree {
            let (col, w) = a.entry(m, j);
            *slot += w * x[col * channels + c];
            j += W;
        }
    }

    let mut bar = W / 2;
    while bar > 0 {
        for lane in 0..bar {
            let other = partial[lane + bar];
            partial[lane] += other;
        }
        bar /= 2;
    }
    partial[0]
}

/// Run `row` for every logical row of `y`
#[inline]
fn launch_rows<F>(y: &mut [Complex128], row: F)
where
    F: Fn(usize) -> Complex128 + Sync + Send,
{
    #[cfg(feature = "rayon")]
    {
        y.par_iter_mut()
            .with_min_len(MIN_ROWS_PER_TASK)
            .enumerate()
            .for_each(|(r, out)| *out = row(r));
    }

    #[cfg(not(feature = "rayon"))]
    {
        for (r, out) in y.iter_mut().enumerate() {
            *out = row(r);
        }
    }
}

/// Strictly sequential scalar product
///
/// `y` must hold `a.nrows() * channels` elements and `x`
/// `a.ncols() * channels`.
pub fn serial_spmm<S: RowSource>(a: &S, x: &[Complex128], channels: usize, y: &mut [Complex128]) {
    debug_assert_eq!(y.len(), a.nrows() * channels);
    debug_assert_eq!(x.len(), a.ncols() * channels);
    for (r, out) in y.iter_mut().enumerate() {
        *out = scalar_row(a, x, channels, r);
    }
}

/// Scalar-per-row product, rows in parallel
pub fn scalar_spmm<S: RowSource>(a: &S, x: &[Complex128], channels: usize, y: &mut [Complex128]) {
    debug_assert_eq!(y.len(), a.nrows() * channels);
    debug_assert_eq!(x.len(), a.ncols() * channels);
    launch_rows(y, |r| scalar_row(a, x, channels, r));
}

/// Vector-per-row product with `W` lanes per row, groups in parallel
pub fn vector_spmm<S: RowSource, const W: usize>(
    a: &S,
    x: &[Complex128],
    channels: usize,
    y: &mut [Complex128],
) {
    debug_assert!(W.is_power_of_two());
    debug_assert_eq!(y.len(), a.nrows() * channels);
    debug_assert_eq!(x.len(), a.ncols() * channels);
    launch_rows(y, |r| vector_row::<S, W>(a, x, channels, r));
}
