//! FFT algorithm contracts for backend consistency
//!
//! This module defines the trait that ensures all backends implement the
//! same Fourier transform algorithm. This guarantees numerical parity
//! between host and device execution of the grid transform.
//!
//! # Algorithm: Stockham Autosort FFT
//!
//! The Stockham algorithm is chosen over Cooley-Tukey because:
//!
//! 1. **No bit-reversal permutation**
//! 2. **Sequential memory access**
//! 3. **Double-buffering** maps directly onto device kernels
//!
//! Lengths that are not a power of two are handled with Bluestein's
//! chirp-z identity on top of the same Stockham kernel:
//!
//! ```text
//! X[k] = w[k] * sum_j (x[j] * w[j]) * conj(w[k - j]),   w[j] = exp(sign * πi * j² / N)
//! ```
//!
//! evaluated as a power-of-two circular convolution of length `L >= 2N - 1`.
//!
//! # Algorithm Reference
//!
//! ```text
//! Stockham FFT (radix-2):
//!
//! Input: x[N] complex, where N = 2^m
//! Output: X[N] complex
//!
//! For each stage s = 0..m:
//!     half_m = 2^s
//!     m = 2^(s+1)
//!     For each group g = 0..(N/m):
//!         For each butterfly b = 0..half_m:
//!             twiddle = exp(-2πi * b / m)  // or +2πi for inverse
//!             even = src[g * half_m + b]
//!             odd = src[N/2 + g * half_m + b] * twiddle
//!             dst[g * m + b] = even + odd
//!             dst[g * m + b + half_m] = even - odd
//!     swap(src, dst)  // Double buffering
//! ```

use crate::dtype::Complex128;
use crate::error::{Error, Result};
use crate::runtime::Runtime;

// ============================================================================
// FFT Configuration
// ============================================================================

/// Direction of FFT computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftDirection {
    /// Forward FFT: image domain → frequency domain
    /// Uses twiddle factor: e^(-2πi * k / N)
    Forward,
    /// Inverse FFT: frequency domain → image domain
    /// Uses twiddle factor: e^(+2πi * k / N)
    Inverse,
}

impl FftDirection {
    /// Sign of the twiddle exponent
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Self::Forward => -1.0,
            Self::Inverse => 1.0,
        }
    }
}

/// Normalization mode for FFT
///
/// | Mode     | Forward Factor | Inverse Factor | Roundtrip          |
/// |----------|----------------|----------------|--------------------|
/// | None     | 1              | 1              | ifft(fft(x)) = N*x |
/// | Backward | 1              | 1/N            | ifft(fft(x)) = x   |
/// | Ortho    | 1/√N           | 1/√N           | ifft(fft(x)) = x   |
/// | Forward  | 1/N            | 1              | ifft(fft(x)) = x   |
///
/// The grid transform uses `Ortho`: forward and inverse are then exact
/// adjoints of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FftNormalization {
    /// No normalization (forward: 1, inverse: 1)
    None,
    /// Normalize inverse by 1/N (forward: 1, inverse: 1/N)
    #[default]
    Backward,
    /// Normalize both by 1/sqrt(N)
    ///
    /// Preserves Parseval's theorem: `sum(|x|²) == sum(|X|²)`.
    Ortho,
    /// Normalize forward by 1/N (forward: 1/N, inverse: 1)
    Forward,
}

impl FftNormalization {
    /// Get the normalization factor for a given direction and size
    #[inline]
    pub fn factor(self, direction: FftDirection, n: usize) -> f64 {
        let n_f = n as f64;
        match (self, direction) {
            (Self::None, _) => 1.0,
            (Self::Backward, FftDirection::Forward) => 1.0,
            (Self::Backward, FftDirection::Inverse) => 1.0 / n_f,
            (Self::Ortho, _) => 1.0 / n_f.sqrt(),
            (Self::Forward, FftDirection::Forward) => 1.0 / n_f,
            (Self::Forward, FftDirection::Inverse) => 1.0,
        }
    }
}

// ============================================================================
// FFT Algorithm Trait
// ============================================================================

/// Algorithmic contract for multi-dimensional FFTs over device buffers
pub trait FftAlgorithms<R: Runtime> {
    /// In-place N-D FFT over a subset of axes
    ///
    /// # Arguments
    ///
    /// * `data` - Row-major buffer of `prod(shape)` elements
    /// * `shape` - Logical array shape (may include untransformed axes such
    ///   as a trailing channel axis)
    /// * `axes` - Axes to transform, each `< shape.len()`
    /// * `direction` - Forward or Inverse FFT
    /// * `norm` - Normalization mode, applied per transformed axis
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if `data` does not hold `prod(shape)` elements
    /// - `InvalidArgument` if an axis is out of range or repeated
    fn fftn(
        &self,
        data: &mut R::Buffer<Complex128>,
        shape: &[usize],
        axes: &[usize],
        direction: FftDirection,
        norm: FftNormalization,
    ) -> Result<()>;
}

/// Validate an axis list against a shape
pub fn validate_fft_axes(shape: &[usize], axes: &[usize]) -> Result<()> {
    for (i, &axis) in axes.iter().enumerate() {
        if axis >= shape.len() {
            return Err(Error::invalid_argument(
                "axes",
                format!("axis {} out of range for {} dimensions", axis, shape.len()),
            ));
        }
        if axes[..i].contains(&axis) {
            return Err(Error::invalid_argument(
                "axes",
                format!("axis {} repeated", axis),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_factors() {
        let n = 16;
        assert_eq!(FftNormalization::Ortho.factor(FftDirection::Forward, n), 0.25);
        assert_eq!(FftNormalization::Ortho.factor(FftDirection::Inverse, n), 0.25);
        assert_eq!(
            FftNormalization::Backward.factor(FftDirection::Inverse, n),
            1.0 / 16.0
        );
        assert_eq!(FftNormalization::None.factor(FftDirection::Inverse, n), 1.0);
    }

    #[test]
    fn test_validate_fft_axes() {
        assert!(validate_fft_axes(&[4, 4, 2], &[0, 1]).is_ok());
        assert!(validate_fft_axes(&[4, 4, 2], &[3]).is_err());
        assert!(validate_fft_axes(&[4, 4, 2], &[1, 1]).is_err());
    }
}
