//! Common test utilities
#![allow(dead_code)]

use std::f64::consts::PI;

use nufft::dtype::Complex128;
use nufft::runtime::Runtime;
use nufft::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use nufft::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Seeded generator so failures reproduce
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `m` sample coordinates per axis, uniform in `[-π, π)`, row-major `M × ndims`
pub fn random_samples(rng: &mut StdRng, m: usize, ndims: usize) -> Vec<f64> {
    (0..m * ndims).map(|_| rng.random_range(-PI..PI)).collect()
}

/// Complex values with real and imaginary parts uniform in `[-1, 1)`
pub fn random_complex(rng: &mut StdRng, len: usize) -> Vec<Complex128> {
    (0..len)
        .map(|_| Complex128::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)))
        .collect()
}

/// Random complex tensor of the given shape
pub fn random_tensor(rng: &mut StdRng, shape: &[usize]) -> Tensor {
    let n = shape.iter().product();
    Tensor::from_vec(random_complex(rng, n), shape).unwrap()
}

/// `‖a - b‖ / ‖b‖`
pub fn rel_error(a: &[Complex128], b: &[Complex128]) -> f64 {
    assert_eq!(a.len(), b.len(), "length mismatch");
    let diff: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| (x - y).magnitude_squared())
        .sum();
    let norm: f64 = b.iter().map(|y| y.magnitude_squared()).sum();
    (diff / norm).sqrt()
}

/// Assert two complex slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_c128(a: &[Complex128], b: &[Complex128], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (*x - *y).magnitude();
        let tol = atol + rtol * y.magnitude();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Dense `nrows × ncols` reference product with channel-interleaved operands
pub fn dense_spmm(
    dense: &[Complex128],
    shape: [usize; 2],
    x: &[Complex128],
    channels: usize,
) -> Vec<Complex128> {
    let [nrows, ncols] = shape;
    let mut y = vec![Complex128::ZERO; nrows * channels];
    for r in 0..nrows {
        for c in 0..channels {
            let mut acc = Complex128::ZERO;
            for k in 0..ncols {
                acc += dense[r * ncols + k] * x[k * channels + c];
            }
            y[r * channels + c] = acc;
        }
    }
    y
}
