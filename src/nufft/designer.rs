//! Interpolation-kernel designers
//!
//! A designer turns sample coordinates and grid geometry into the two
//! ingredients of a plan: the apodization `scaling` vector and the
//! `M × prod(Kd)` interpolation matrix. Designers may also report the
//! per-axis factors of a separable matrix, which enables the Kronecker
//! storage format.
//!
//! [`KaiserBesselDesigner`] is a separable Kaiser-Bessel kernel with
//! Beatty's shape parameter.

use std::f64::consts::PI;

use crate::dtype::Complex128;
use crate::error::{Error, Result};
use crate::sparse::{AxisFactor, CsrMatrix};

/// Output of a [`KernelDesigner`]
#[derive(Debug, Clone)]
pub struct KernelDesign {
    /// Apodization correction, `prod(Nd)` values, row-major
    pub scaling: Vec<f64>,
    /// Interpolation matrix, `M × prod(Kd)`, `prod(Jd)` entries per row
    pub interp: CsrMatrix,
    /// Per-axis factors of `interp` when it is separable
    ///
    /// Each row of `interp` must list its entries in mixed-radix order over
    /// the factors, last axis fastest.
    pub factors: Option<Vec<AxisFactor>>,
}

/// Collaborator that designs the interpolation kernel for a geometry
pub trait KernelDesigner: Send + Sync {
    /// Design scaling and interpolation for `samples` (`M × ndims` row-major,
    /// radians)
    fn design(
        &self,
        samples: &[f64],
        nd: &[usize],
        kd: &[usize],
        jd: &[usize],
    ) -> Result<KernelDesign>;
}

/// Separable Kaiser-Bessel gridding kernel
///
/// Per axis, with oversampling `α = K/N` and width `J`:
///
/// ```text
/// β      = π * sqrt(max(0, (J/α)² (α - 1/2)² - 0.8))
/// ψ(u)   = I0(β * sqrt(1 - (2u/J)²)),                |u| <= J/2
/// Φ(t)   = J * sinh(z) / z,   z² = β² - (π J t / K)²
/// ```
///
/// A sample at `ω` sits at grid position `u0 = ω K / 2π`; its `J`
/// neighbours are `k = floor(u0 - J/2) + 1 + j`. The weight of neighbour `k`
/// is `ψ(u0 - k) * exp(2πi k c / K)` with image center `c = N/2`, and the
/// scaling of image index `n` is `1 / Φ(n - c)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KaiserBesselDesigner;

impl KaiserBesselDesigner {
    /// Create the designer
    pub fn new() -> Self {
        Self
    }

    /// Beatty's shape parameter for width `j` and oversampling `alpha`
    pub fn beta(j: usize, alpha: f64) -> f64 {
        let ja = j as f64 / alpha;
        PI * (ja * ja * (alpha - 0.5) * (alpha - 0.5) - 0.8).max(0.0).sqrt()
    }
}

/// Modified Bessel function of the first kind, order zero (power series)
pub(crate) fn bessel_i0(x: f64) -> f64 {
    let q = 0.25 * x * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;
    while term > 1e-17 * sum {
        term *= q / (k * k);
        sum += term;
        k += 1.0;
    }
    sum
}

/// Per-axis kernel parameters
#[derive(Debug, Clone, Copy)]
struct AxisKernel {
    n: usize,
    k: usize,
    j: usize,
    beta: f64,
    center: f64,
}

impl AxisKernel {
    fn new(n: usize, k: usize, j: usize) -> Self {
        Self {
            n,
            k,
            j,
            beta: KaiserBesselDesigner::beta(j, k as f64 / n as f64),
            center: (n / 2) as f64,
        }
    }

    /// Kernel Fourier transform at image offset `t` from the center
    fn phi(&self, t: f64) -> f64 {
        let j = self.j as f64;
        let a = PI * j * t / self.k as f64;
        let z2 = self.beta * self.beta - a * a;
        if z2 > 0.0 {
            let z = z2.sqrt();
            j * z.sinh() / z
        } else if z2 < 0.0 {
            let z = (-z2).sqrt();
            j * z.sin() / z
        } else {
            j
        }
    }

    /// Neighbour columns and weights of a sample at `omega`
    fn row(&self, omega: f64, columns: &mut Vec<u32>, weights: &mut Vec<Complex128>) {
        let kf = self.k as f64;
        let jf = self.j as f64;
        let u0 = omega * kf / (2.0 * PI);
        let k_start = (u0 - 0.5 * jf).floor() as i64 + 1;
        for step in 0..self.j as i64 {
            let k = k_start + step;
            let u = u0 - k as f64;
            let r = 2.0 * u / jf;
            let psi = bessel_i0(self.beta * (1.0 - r * r).max(0.0).sqrt());
            let phase = Complex128::cis(2.0 * PI * k as f64 * self.center / kf);
            columns.push(k.rem_euclid(self.k as i64) as u32);
            weights.push(phase * psi);
        }
    }
}

impl KernelDesigner for KaiserBesselDesigner {
    fn design(
        &self,
        samples: &[f64],
        nd: &[usize],
        kd: &[usize],
        jd: &[usize],
    ) -> Result<KernelDesign> {
        let ndims = nd.len();
        if ndims == 0 || kd.len() != ndims || jd.len() != ndims || samples.len() % ndims != 0 {
            return Err(Error::invalid_plan("geometry does not match the sample layout"));
        }
        let m = samples.len() / ndims;
        let axes: Vec<AxisKernel> = (0..ndims)
            .map(|d| AxisKernel::new(nd[d], kd[d], jd[d]))
            .collect();

        // Scaling: product of per-axis 1/Φ over the image, last axis fastest
        let mut scaling = vec![1.0f64; nd.iter().product()];
        let mut inner = 1usize;
        for axis in axes.iter().rev() {
            let inv: Vec<f64> = (0..axis.n)
                .map(|n| {
                    let phi = axis.phi(n as f64 - axis.center);
                    if phi > 0.0 && phi.is_finite() {
                        Ok(1.0 / phi)
                    } else {
                        Err(Error::invalid_plan(format!(
                            "kernel transform is not positive at image index {} (J={}, K={})",
                            n, axis.j, axis.k
                        )))
                    }
                })
                .collect::<Result<_>>()?;
            for (i, s) in scaling.iter_mut().enumerate() {
                *s *= inv[(i / inner) % axis.n];
            }
            inner *= axis.n;
        }

        // Per-axis factors
        let mut factors: Vec<AxisFactor> = axes
            .iter()
            .map(|axis| AxisFactor {
                width: axis.j,
                columns: Vec::with_capacity(m * axis.j),
                weights: Vec::with_capacity(m * axis.j),
            })
            .collect();
        for row in 0..m {
            for (d, axis) in axes.iter().enumerate() {
                let f = &mut factors[d];
                axis.row(samples[row * ndims + d], &mut f.columns, &mut f.weights);
            }
        }

        // Explicit rows: mixed radix over the factors, last axis fastest
        let degree: usize = jd.iter().product();
        let mut strides = vec![1usize; ndims];
        for d in (0..ndims - 1).rev() {
            strides[d] = strides[d + 1] * kd[d + 1];
        }
        let mut col_indices = Vec::with_capacity(m * degree);
        let mut values = Vec::with_capacity(m * degree);
        let mut digits = vec![0usize; ndims];
        for row in 0..m {
            digits.iter_mut().for_each(|v| *v = 0);
            for _ in 0..degree {
                let mut col = 0usize;
                let mut w = Complex128::ONE;
                for d in 0..ndims {
                    let idx = row * jd[d] + digits[d];
                    col += factors[d].columns[idx] as usize * strides[d];
                    w *= factors[d].weights[idx];
                }
                col_indices.push(col as u32);
                values.push(w);

                for d in (0..ndims).rev() {
                    digits[d] += 1;
                    if digits[d] < jd[d] {
                        break;
                    }
                    digits[d] = 0;
                }
            }
        }

        let interp = CsrMatrix::from_fixed_degree(
            [m, kd.iter().product()],
            degree,
            col_indices,
            values,
        )?;

        Ok(KernelDesign {
            scaling,
            interp,
            factors: Some(factors),
        })
    }
}
