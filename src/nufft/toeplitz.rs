//! Toeplitz fast path for the self-adjoint normal operator
//!
//! `adjoint(forward(·))` over a fully transformed image is (to kernel
//! accuracy) a Toeplitz operator. Its symbol is embedded in a circulant on
//! the `Kd` grid, which must satisfy `Kd >= 2 Nd - 1` on every axis so the
//! circular convolution does not alias. The embedding is read off by
//! probing the exact normal operator with an impulse at every corner of
//! the image, then transformed once; applying it costs two grid FFTs and a
//! pointwise product per channel.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use super::{NufftOperator, coil};
use crate::algorithm::fft::{FftAlgorithms, FftDirection};
use crate::algorithm::spmv::SpmvAlgorithms;
use crate::dtype::Complex128;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Frequency-domain circulant kernel on the `Kd` grid
#[derive(Debug, Clone, PartialEq)]
pub struct ToeplitzKernel {
    kd: Vec<usize>,
    values: Vec<Complex128>,
}

impl ToeplitzKernel {
    /// Grid shape the kernel is defined on
    pub fn kd(&self) -> &[usize] {
        &self.kd
    }

    /// Kernel values, `prod(Kd)` entries, row-major
    pub fn values(&self) -> &[Complex128] {
        &self.values
    }
}

enum CacheState {
    Uninitialized,
    Initializing,
    Ready(Arc<ToeplitzKernel>),
}

/// Lazily computed kernel shared by concurrent callers
///
/// At most one caller computes at a time; the others block until it
/// finishes. A failed or panicking computation leaves the cache empty so
/// the next caller retries.
pub(crate) struct ToeplitzCache {
    state: Mutex<CacheState>,
    ready: Condvar,
}

/// Resets an `Initializing` cache if the computation unwinds
struct ResetGuard<'a> {
    cache: &'a ToeplitzCache,
    armed: bool,
}

impl ResetGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ResetGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.cache.state.lock() = CacheState::Uninitialized;
            self.cache.ready.notify_all();
        }
    }
}

impl ToeplitzCache {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(CacheState::Uninitialized),
            ready: Condvar::new(),
        }
    }

    pub(crate) fn get_or_try_init<F>(&self, init: F) -> Result<Arc<ToeplitzKernel>>
    where
        F: FnOnce() -> Result<ToeplitzKernel>,
    {
        {
            let mut state = self.state.lock();
            loop {
                if let CacheState::Ready(kernel) = &*state {
                    return Ok(Arc::clone(kernel));
                }
                if matches!(*state, CacheState::Initializing) {
                    self.ready.wait(&mut state);
                    continue;
                }
                *state = CacheState::Initializing;
                break;
            }
        }

        let guard = ResetGuard {
            cache: self,
            armed: true,
        };
        match init() {
            Ok(kernel) => {
                guard.disarm();
                let kernel = Arc::new(kernel);
                *self.state.lock() = CacheState::Ready(Arc::clone(&kernel));
                self.ready.notify_all();
                Ok(kernel)
            }
            // dropping the armed guard resets the state and wakes waiters
            Err(e) => Err(e),
        }
    }

    pub(crate) fn get(&self) -> Option<Arc<ToeplitzKernel>> {
        match &*self.state.lock() {
            CacheState::Ready(kernel) => Some(Arc::clone(kernel)),
            _ => None,
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(*self.state.lock(), CacheState::Ready(_))
    }

    /// Drop a ready kernel; an in-flight computation is left alone
    pub(crate) fn invalidate(&self) {
        let mut state = self.state.lock();
        if !matches!(*state, CacheState::Initializing) {
            *state = CacheState::Uninitialized;
        }
    }
}

impl<R: Runtime> NufftOperator<R>
where
    R::Client: SpmvAlgorithms<R> + FftAlgorithms<R>,
{
    /// Compute the Toeplitz kernel now instead of on the first
    /// [`apply_fast`](Self::apply_fast)
    ///
    /// # Errors
    ///
    /// `Configuration` if the plan does not transform every axis or if
    /// `Kd[d] < 2 Nd[d] - 1` on some axis.
    pub fn precompute_kernel(&self) -> Result<()> {
        self.toeplitz
            .get_or_try_init(|| self.compute_toeplitz_kernel())
            .map(|_| ())
    }

    /// Approximate [`normal_combined`](Self::normal_combined) through the
    /// Toeplitz embedding
    ///
    /// Input and output are single-channel images of shape `Nd`. The kernel
    /// is computed on first use.
    ///
    /// # Errors
    ///
    /// `Configuration` unless the plan transforms every axis and
    /// `Kd[d] >= 2 Nd[d] - 1` on each axis; plans oversampled by less than
    /// about 2 (for example `Kd = 1.5 Nd`) must use
    /// [`normal_combined`](Self::normal_combined) instead. `ShapeMismatch`
    /// if `x` is not shaped `Nd`.
    pub fn apply_fast(&self, x: &Tensor) -> Result<Tensor> {
        self.check_exact(x, self.plan.nd())?;
        let kernel = self
            .toeplitz
            .get_or_try_init(|| self.compute_toeplitz_kernel())?;

        let channels = self.plan.batch();
        let xx = coil::broadcast(x.as_slice(), self.profile.as_slice(), channels);
        let mut grid = self.to_grid_flat(&xx, channels)?;
        for (cell, &t) in grid.chunks_exact_mut(channels).zip(kernel.values()) {
            cell.iter_mut().for_each(|v| *v *= t);
        }
        let back = self.from_grid_flat(grid, channels)?;
        let out = coil::combine(&back, self.profile.as_slice(), channels);
        Tensor::from_vec(out, self.plan.nd())
    }

    /// Drop the cached kernel
    pub fn invalidate_kernel(&mut self) {
        self.toeplitz.invalidate();
    }

    /// Whether a kernel is cached
    pub fn has_kernel(&self) -> bool {
        self.toeplitz.is_ready()
    }

    /// The cached kernel, if any
    pub fn toeplitz_kernel(&self) -> Option<Arc<ToeplitzKernel>> {
        self.toeplitz.get()
    }

    fn compute_toeplitz_kernel(&self) -> Result<ToeplitzKernel> {
        let nd = self.plan.nd();
        let kd = self.plan.kd();
        let ndims = nd.len();
        if self.plan.ft_axes().len() != ndims {
            return Err(Error::configuration(
                "Toeplitz embedding requires the FFT over every image axis",
            ));
        }
        if let Some(d) = (0..ndims).find(|&d| kd[d] + 1 < 2 * nd[d]) {
            return Err(Error::configuration(format!(
                "Toeplitz embedding requires Kd >= 2 Nd - 1 (axis {}: Kd={}, Nd={})",
                d, kd[d], nd[d]
            )));
        }

        let mut kstrides = vec![1usize; ndims];
        for d in (0..ndims - 1).rev() {
            kstrides[d] = kstrides[d + 1] * kd[d + 1];
        }

        // Corners: q[d] in {0, Nd[d] - 1}, collapsed on unit axes
        let choices: Vec<Vec<usize>> = nd
            .iter()
            .map(|&n| if n > 1 { vec![0, n - 1] } else { vec![0] })
            .collect();
        let n_corners: usize = choices.iter().map(Vec::len).product();

        let image_len = self.plan.image_len();
        let mut embedding = vec![Complex128::ZERO; self.plan.grid_len()];
        let mut pick = vec![0usize; ndims];
        for _ in 0..n_corners {
            let corner: Vec<usize> = (0..ndims).map(|d| choices[d][pick[d]]).collect();
            let mut flat = 0usize;
            for d in 0..ndims {
                flat = flat * nd[d] + corner[d];
            }
            let mut impulse = vec![Complex128::ZERO; image_len];
            impulse[flat] = Complex128::ONE;
            let column = self.adjoint_flat(&self.forward_flat(&impulse, 1)?, 1)?;

            // column[n] ≈ t(n - q); store at (n - q) mod Kd
            let mut digits = vec![0usize; ndims];
            for &v in &column {
                let g: usize = (0..ndims)
                    .map(|d| {
                        let offset = digits[d] as i64 - corner[d] as i64;
                        offset.rem_euclid(kd[d] as i64) as usize * kstrides[d]
                    })
                    .sum();
                embedding[g] = v;
                for d in (0..ndims).rev() {
                    digits[d] += 1;
                    if digits[d] < nd[d] {
                        break;
                    }
                    digits[d] = 0;
                }
            }

            for d in (0..ndims).rev() {
                pick[d] += 1;
                if pick[d] < choices[d].len() {
                    break;
                }
                pick[d] = 0;
            }
        }

        let gain = (self.plan.grid_len() as f64).sqrt();
        let mut values = self.grid_fft(embedding, 1, FftDirection::Forward)?;
        values.iter_mut().for_each(|v| *v = *v * gain);

        debug!(kd = ?kd, corners = n_corners, "computed Toeplitz kernel");
        Ok(ToeplitzKernel {
            kd: kd.to_vec(),
            values,
        })
    }
}
