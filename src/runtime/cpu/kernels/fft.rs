//! FFT kernels using Stockham autosort algorithm
//!
//! Power-of-two lengths run the Stockham radix-2 kernel directly. Other
//! lengths go through Bluestein's chirp-z transform, which reduces them to
//! a power-of-two circular convolution evaluated with the same kernel.
//!
//! # Algorithm: Stockham Radix-2 FFT
//!
//! ```text
//! For each stage s = 0..log2(N):
//!     half_m = 2^s
//!     m = 2^(s+1)
//!     For each group g = 0..(N/m):
//!         For each butterfly b = 0..half_m:
//!             twiddle = exp(sign * 2πi * b / m)
//!             even = src[g * half_m + b]
//!             odd = src[N/2 + g * half_m + b] * twiddle
//!             dst[g * m + b] = even + odd
//!             dst[g * m + b + half_m] = even - odd
//!     swap(src, dst)
//! ```

use crate::dtype::Complex128;
use std::f64::consts::PI;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Stockham FFT for Complex128 data
///
/// # Arguments
///
/// * `input` - Input complex data slice of length N (must be power of 2)
/// * `output` - Output buffer of length N, filled with the FFT result
/// * `inverse` - If true, compute inverse FFT
/// * `normalize_factor` - Scale factor to apply to each output element
pub fn stockham_fft_c128(
    input: &[Complex128],
    output: &mut [Complex128],
    inverse: bool,
    normalize_factor: f64,
) {
    let n = input.len();
    debug_assert!(n > 0 && n.is_power_of_two(), "N must be power of 2");
    debug_assert_eq!(input.len(), output.len());

    if n == 1 {
        output[0] = input[0] * normalize_factor;
        return;
    }

    let log_n = n.trailing_zeros() as usize;
    let sign = if inverse { 1.0f64 } else { -1.0f64 };

    let mut buf_a: Vec<Complex128> = input.to_vec();
    let mut buf_b: Vec<Complex128> = vec![Complex128::ZERO; n];

    let mut src = &mut buf_a;
    let mut dst = &mut buf_b;

    for stage in 0..log_n {
        let m = 1 << (stage + 1);
        let half_m = 1 << stage;
        let groups = n / m;

        for g in 0..groups {
            for b in 0..half_m {
                let twiddle = Complex128::cis(sign * 2.0 * PI * (b as f64) / (m as f64));

                let even = src[g * half_m + b];
                let odd = src[n / 2 + g * half_m + b] * twiddle;

                dst[g * m + b] = even + odd;
                dst[g * m + b + half_m] = even - odd;
            }
        }

        std::mem::swap(&mut src, &mut dst);
    }

    for (out, v) in output.iter_mut().zip(src.iter()) {
        *out = *v * normalize_factor;
    }
}

/// Precomputed 1-D transform of a fixed length and direction
#[derive(Debug, Clone)]
pub enum LinePlan {
    /// Power-of-two length, direct Stockham
    Radix2 {
        /// Transform length
        n: usize,
        /// Direction flag
        inverse: bool,
    },
    /// Arbitrary length via chirp-z convolution
    Bluestein {
        /// Transform length
        n: usize,
        /// Convolution length, a power of two `>= 2n - 1`
        conv_len: usize,
        /// `w[j] = exp(sign * πi * j² / n)` for `j < n`
        chirp: Vec<Complex128>,
        /// Unnormalized FFT of the wrapped `conj(w)` sequence
        kernel: Vec<Complex128>,
    },
}

impl LinePlan {
    /// Plan a transform of length `n` (`n >= 1`)
    pub fn new(n: usize, inverse: bool) -> Self {
        if n.is_power_of_two() {
            return Self::Radix2 { n, inverse };
        }

        let sign = if inverse { 1.0f64 } else { -1.0f64 };
        let conv_len = (2 * n - 1).next_power_of_two();
        let period = 2 * n;
        let chirp: Vec<Complex128> = (0..n)
            .map(|j| {
                let jj = (j * j) % period;
                Complex128::cis(sign * PI * jj as f64 / n as f64)
            })
            .collect();

        let mut wrapped = vec![Complex128::ZERO; conv_len];
        wrapped[0] = chirp[0].conj();
        for t in 1..n {
            wrapped[t] = chirp[t].conj();
            wrapped[conv_len - t] = chirp[t].conj();
        }
        let mut kernel = vec![Complex128::ZERO; conv_len];
        stockham_fft_c128(&wrapped, &mut kernel, false, 1.0);

        Self::Bluestein {
            n,
            conv_len,
            chirp,
            kernel,
        }
    }

    /// Transform length
    pub fn len(&self) -> usize {
        match self {
            Self::Radix2 { n, .. } | Self::Bluestein { n, .. } => *n,
        }
    }

    /// Transform `line` in place and scale by `normalize_factor`
    pub fn execute(&self, line: &mut [Complex128], normalize_factor: f64) {
        debug_assert_eq!(line.len(), self.len());
        match self {
            Self::Radix2 { inverse, .. } => {
                let input = line.to_vec();
                stockham_fft_c128(&input, line, *inverse, normalize_factor);
            }
            Self::Bluestein {
                n,
                conv_len,
                chirp,
                kernel,
            } => {
                let mut a = vec![Complex128::ZERO; *conv_len];
                for j in 0..*n {
                    a[j] = line[j] * chirp[j];
                }
                let mut fa = vec![Complex128::ZERO; *conv_len];
                stockham_fft_c128(&a, &mut fa, false, 1.0);
                for (p, k) in fa.iter_mut().zip(kernel) {
                    *p *= *k;
                }
                stockham_fft_c128(&fa, &mut a, true, 1.0 / *conv_len as f64);
                for k in 0..*n {
                    line[k] = chirp[k] * a[k] * normalize_factor;
                }
            }
        }
    }
}

/// Transform contiguous lines of length `plan.len()` packed back to back
fn execute_lines(plan: &LinePlan, lines: &mut [Complex128], normalize_factor: f64) {
    let n = plan.len();

    #[cfg(feature = "rayon")]
    {
        lines
            .par_chunks_mut(n)
            .for_each(|line| plan.execute(line, normalize_factor));
    }

    #[cfg(not(feature = "rayon"))]
    {
        for line in lines.chunks_mut(n) {
            plan.execute(line, normalize_factor);
        }
    }
}

/// 1-D FFT along `axis` of a row-major array of shape `shape`
///
/// Strided lines are gathered into a contiguous scratch array, transformed
/// in parallel and scattered back.
pub fn fft_axis_c128(
    data: &mut [Complex128],
    shape: &[usize],
    axis: usize,
    inverse: bool,
    normalize_factor: f64,
) {
    let n = shape[axis];
    if n == 0 || data.is_empty() {
        return;
    }
    let inner: usize = shape[axis + 1..].iter().product();
    let outer: usize = shape[..axis].iter().product();
    let plan = LinePlan::new(n, inverse);

    if inner == 1 {
        execute_lines(&plan, data, normalize_factor);
        return;
    }

    let mut lines = vec![Complex128::ZERO; outer * inner * n];
    for o in 0..outer {
        for k in 0..n {
            let src = (o * n + k) * inner;
            for i in 0..inner {
                lines[(o * inner + i) * n + k] = data[src + i];
            }
        }
    }

    execute_lines(&plan, &mut lines, normalize_factor);

    for o in 0..outer {
        for k in 0..n {
            let dst = (o * n + k) * inner;
            for i in 0..inner {
                data[dst + i] = lines[(o * inner + i) * n + k];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_dft(x: &[Complex128], inverse: bool) -> Vec<Complex128> {
        let n = x.len();
        let sign = if inverse { 1.0 } else { -1.0 };
        (0..n)
            .map(|k| {
                (0..n)
                    .map(|j| x[j] * Complex128::cis(sign * 2.0 * PI * ((j * k) % n) as f64 / n as f64))
                    .sum()
            })
            .collect()
    }

    fn signal(n: usize) -> Vec<Complex128> {
        (0..n)
            .map(|i| Complex128::new((i as f64 * 0.7).sin(), (i as f64 * 0.3).cos() - 0.5))
            .collect()
    }

    fn assert_close(a: &[Complex128], b: &[Complex128], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (i, (p, q)) in a.iter().zip(b).enumerate() {
            assert!(
                (*p - *q).magnitude() < tol,
                "index {}: {} vs {}",
                i,
                p,
                q
            );
        }
    }

    #[test]
    fn test_stockham_matches_dft() {
        for n in [1, 2, 4, 8, 32] {
            let x = signal(n);
            let mut out = vec![Complex128::ZERO; n];
            stockham_fft_c128(&x, &mut out, false, 1.0);
            assert_close(&out, &naive_dft(&x, false), 1e-10);
        }
    }

    #[test]
    fn test_bluestein_matches_dft() {
        for n in [3, 5, 6, 12, 17] {
            for inverse in [false, true] {
                let x = signal(n);
                let mut line = x.clone();
                LinePlan::new(n, inverse).execute(&mut line, 1.0);
                assert_close(&line, &naive_dft(&x, inverse), 1e-9);
            }
        }
    }

    #[test]
    fn test_fft_axis_strided() {
        // shape (3, 4): transform axis 0 (strided, non power of two)
        let shape = [3, 4];
        let x = signal(12);
        let mut data = x.clone();
        fft_axis_c128(&mut data, &shape, 0, false, 1.0);
        for col in 0..4 {
            let column: Vec<Complex128> = (0..3).map(|r| x[r * 4 + col]).collect();
            let expected = naive_dft(&column, false);
            let got: Vec<Complex128> = (0..3).map(|r| data[r * 4 + col]).collect();
            assert_close(&got, &expected, 1e-10);
        }
    }
}
