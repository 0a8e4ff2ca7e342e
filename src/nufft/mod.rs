//! Non-uniform FFT operator
//!
//! The forward transform maps an image on a regular `Nd` grid to `M`
//! irregular frequency samples:
//!
//! ```text
//! forward = degrid ∘ to_grid ∘ apply_scaling
//! adjoint = apply_scaling ∘ from_grid ∘ grid
//! ```
//!
//! - `apply_scaling`: multiply by the apodization correction
//! - `to_grid`: zero-pad into the oversampled `Kd` grid, orthonormal FFT
//!   over the plan's axes
//! - `degrid`: sparse interpolation onto the samples
//!
//! Every stage accepts a trailing channel axis. Channel-profile weighting
//! ([`NufftOperator::broadcast_forward`], [`NufftOperator::combine_adjoint`])
//! and the Toeplitz fast path ([`NufftOperator::apply_fast`]) are layered on
//! top.
//!
//! # Example
//!
//! ```
//! use nufft::prelude::*;
//!
//! let samples = vec![0.3, -1.2, 2.0, 0.7, -2.9, 1.5];
//! let plan = Plan::new(&samples, &[8, 8], &[16, 16], &[4, 4], &PlanOptions::default())?;
//! let op = NufftOperator::new(plan, NufftOptions::default())?;
//!
//! let x = Tensor::ones(&[8, 8]);
//! let y = op.forward(&x)?;
//! assert_eq!(y.shape(), &[3]);
//! let back = op.adjoint(&y)?;
//! assert_eq!(back.shape(), &[8, 8]);
//! # Ok::<(), nufft::error::Error>(())
//! ```

mod coil;
mod designer;
mod grid;
mod interp;
mod options;
mod plan;
mod scaling;
mod toeplitz;

pub use designer::{KaiserBesselDesigner, KernelDesign, KernelDesigner};
pub use options::{ExecutionMode, NufftOptions};
pub use plan::{Plan, PlanOptions};
pub use toeplitz::ToeplitzKernel;

use std::sync::Arc;

use tracing::debug;

use crate::algorithm::fft::FftAlgorithms;
use crate::algorithm::spmv::{DeviceMatrix, SpmvAlgorithms};
use crate::dtype::Complex128;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::runtime::cpu::CpuRuntime;
use crate::sparse::SparseFormat;
use crate::tensor::Tensor;
use toeplitz::ToeplitzCache;

/// Uploaded interpolation operators
struct DeviceResources<R: Runtime> {
    interp: DeviceMatrix<R>,
    interp_t: DeviceMatrix<R>,
}

/// A NUFFT instance bound to one plan and one runtime
///
/// Owns the device resources, the channel profile and the Toeplitz cache.
/// Transforms take `&self` and may run concurrently; profile mutation,
/// release and replanning take `&mut self`.
pub struct NufftOperator<R: Runtime = CpuRuntime> {
    plan: Arc<Plan>,
    client: R::Client,
    options: NufftOptions,
    resources: Option<DeviceResources<R>>,
    released: bool,
    profile: Tensor,
    toeplitz: ToeplitzCache,
}

impl NufftOperator<CpuRuntime> {
    /// Create an operator on the default CPU device
    pub fn new(plan: impl Into<Arc<Plan>>, options: NufftOptions) -> Result<Self> {
        let device = CpuRuntime::default_device();
        Self::with_client(CpuRuntime::default_client(&device), plan, options)
    }
}

impl<R: Runtime> NufftOperator<R>
where
    R::Client: SpmvAlgorithms<R> + FftAlgorithms<R>,
{
    /// Create an operator on an existing runtime client
    ///
    /// In device mode the forward operator (in `options.format`) and the
    /// adjoint operator (CSR) are uploaded immediately.
    ///
    /// # Errors
    ///
    /// `Configuration` if the Kronecker format is requested but the plan
    /// has no per-axis factors. Upload errors are passed through.
    pub fn with_client(
        client: R::Client,
        plan: impl Into<Arc<Plan>>,
        options: NufftOptions,
    ) -> Result<Self> {
        let plan = plan.into();
        let resources = upload::<R>(&client, &plan, &options)?;
        let profile = coil::default_profile(&plan);
        Ok(Self {
            plan,
            client,
            options,
            resources,
            released: false,
            profile,
            toeplitz: ToeplitzCache::new(),
        })
    }

    /// The plan this operator transforms with
    pub fn plan(&self) -> &Arc<Plan> {
        &self.plan
    }

    /// The runtime client
    pub fn client(&self) -> &R::Client {
        &self.client
    }

    /// Execution options
    pub fn options(&self) -> &NufftOptions {
        &self.options
    }

    /// Whether [`release`](Self::release) has been called
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Forward transform: image `Nd` (+ channels) → samples `(M,)` or `(M, batch)`
    pub fn forward(&self, x: &Tensor) -> Result<Tensor> {
        self.check_input(x, self.plan.nd())?;
        let y = self.forward_flat(x.as_slice(), self.plan.batch())?;
        Tensor::from_vec(y, &self.plan.sample_shape())
    }

    /// Adjoint transform: samples → image
    pub fn adjoint(&self, y: &Tensor) -> Result<Tensor> {
        self.check_input(y, &[self.plan.m()])?;
        let x = self.adjoint_flat(y.as_slice(), self.plan.batch())?;
        Tensor::from_vec(x, &self.plan.image_shape())
    }

    /// Exact normal operator `adjoint(forward(x))`
    ///
    /// Degridding is followed directly by gridding in grid space.
    pub fn normal(&self, x: &Tensor) -> Result<Tensor> {
        self.check_input(x, self.plan.nd())?;
        let channels = self.plan.batch();
        let mut xx = x.to_vec();
        scaling::scale_channels(self.plan.scaling(), &mut xx, channels);
        let k = self.to_grid_flat(&xx, channels)?;
        let y = self.degrid_flat(&k, channels)?;
        let k = self.grid_flat(&y, channels)?;
        let mut out = self.from_grid_flat(k, channels)?;
        scaling::scale_channels(self.plan.scaling(), &mut out, channels);
        Tensor::from_vec(out, &self.plan.image_shape())
    }

    /// Drop device resources and the Toeplitz kernel
    ///
    /// Idempotent. Device-mode transforms fail with `Error::Released`
    /// afterwards; host-mode transforms keep working.
    pub fn release(&mut self) {
        if self.resources.take().is_some() {
            debug!(runtime = R::name(), "released device resources");
        }
        self.toeplitz.invalidate();
        self.released = true;
    }

    /// Swap in a new plan
    ///
    /// Uploads the new operators, resets the channel profile and drops the
    /// Toeplitz kernel. On error the operator is left unchanged.
    pub fn replan(&mut self, plan: impl Into<Arc<Plan>>) -> Result<()> {
        let plan = plan.into();
        let resources = upload::<R>(&self.client, &plan, &self.options)?;
        self.profile = coil::default_profile(&plan);
        self.plan = plan;
        self.resources = resources;
        self.released = false;
        self.toeplitz.invalidate();
        debug!(nd = ?self.plan.nd(), samples = self.plan.m(), "replanned operator");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Flat pipelines over channel-interleaved buffers
    // ------------------------------------------------------------------

    pub(crate) fn forward_flat(&self, x: &[Complex128], channels: usize) -> Result<Vec<Complex128>> {
        let mut xx = x.to_vec();
        scaling::scale_channels(self.plan.scaling(), &mut xx, channels);
        let k = self.to_grid_flat(&xx, channels)?;
        self.degrid_flat(&k, channels)
    }

    pub(crate) fn adjoint_flat(&self, y: &[Complex128], channels: usize) -> Result<Vec<Complex128>> {
        let k = self.grid_flat(y, channels)?;
        let mut x = self.from_grid_flat(k, channels)?;
        scaling::scale_channels(self.plan.scaling(), &mut x, channels);
        Ok(x)
    }

    /// Uploaded operators, or `Released`
    fn device(&self) -> Result<&DeviceResources<R>> {
        self.resources.as_ref().ok_or(Error::Released)
    }

    /// Accept `base + (batch,)`, or `base` alone when there is one channel
    fn check_input(&self, t: &Tensor, base: &[usize]) -> Result<()> {
        let shape = t.shape();
        let batch = self.plan.batch();
        let n = base.len();
        let with_channels = shape.len() == n + 1 && shape[..n] == *base && shape[n] == batch;
        let bare = batch == 1 && shape == base;
        if with_channels || bare {
            return Ok(());
        }
        let mut expected = base.to_vec();
        if self.plan.batched() {
            expected.push(batch);
        }
        Err(Error::shape_mismatch(&expected, shape))
    }

    /// Accept exactly `base`
    fn check_exact(&self, t: &Tensor, base: &[usize]) -> Result<()> {
        if t.shape() != base {
            return Err(Error::shape_mismatch(base, t.shape()));
        }
        Ok(())
    }
}

fn upload<R: Runtime>(
    client: &R::Client,
    plan: &Plan,
    options: &NufftOptions,
) -> Result<Option<DeviceResources<R>>> {
    if options.execution == ExecutionMode::Host {
        return Ok(None);
    }
    let interp = match options.format {
        SparseFormat::Csr => DeviceMatrix::<R>::upload_csr(client, plan.interp())?,
        SparseFormat::Ell => DeviceMatrix::<R>::upload_ell(client, plan.ell())?,
        SparseFormat::Kronecker => {
            let kron = plan.kronecker().ok_or_else(|| {
                Error::configuration("pELL format requires a designer that reports axis factors")
            })?;
            DeviceMatrix::<R>::upload_kronecker(client, kron)?
        }
    };
    let interp_t = DeviceMatrix::<R>::upload_csr(client, plan.interp_t())?;
    Ok(Some(DeviceResources { interp, interp_t }))
}
