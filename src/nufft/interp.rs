//! Interpolation stage: degridding and gridding

use super::{ExecutionMode, NufftOperator};
use crate::algorithm::fft::FftAlgorithms;
use crate::algorithm::spmv::{DeviceMatrix, SpmvAlgorithms};
use crate::dtype::Complex128;
use crate::error::Result;
use crate::runtime::cpu::kernels;
use crate::runtime::{Runtime, RuntimeClient};
use crate::sparse::CsrMatrix;
use crate::tensor::Tensor;
use tracing::trace;

impl<R: Runtime> NufftOperator<R>
where
    R::Client: SpmvAlgorithms<R> + FftAlgorithms<R>,
{
    /// Interpolate the grid onto the samples
    ///
    /// Input `Kd` (+ channels), output `(M,)` or `(M, batch)`. All channels
    /// are serviced by one launch.
    pub fn degrid(&self, k: &Tensor) -> Result<Tensor> {
        self.check_input(k, self.plan.kd())?;
        let y = self.degrid_flat(k.as_slice(), self.plan.batch())?;
        Tensor::from_vec(y, &self.plan.sample_shape())
    }

    /// Spread the samples onto the grid (conjugate transpose of [`degrid`](Self::degrid))
    pub fn grid(&self, y: &Tensor) -> Result<Tensor> {
        self.check_input(y, &[self.plan.m()])?;
        let k = self.grid_flat(y.as_slice(), self.plan.batch())?;
        Tensor::from_vec(k, &self.plan.grid_shape())
    }

    pub(crate) fn degrid_flat(
        &self,
        grid: &[Complex128],
        channels: usize,
    ) -> Result<Vec<Complex128>> {
        match self.options.execution {
            ExecutionMode::Host => Ok(host_spmm(self.plan.interp(), grid, channels)),
            ExecutionMode::Device => {
                let resources = self.device()?;
                self.launch(&resources.interp, grid, channels)
            }
        }
    }

    pub(crate) fn grid_flat(
        &self,
        samples: &[Complex128],
        channels: usize,
    ) -> Result<Vec<Complex128>> {
        match self.options.execution {
            ExecutionMode::Host => Ok(host_spmm(self.plan.interp_t(), samples, channels)),
            ExecutionMode::Device => {
                let resources = self.device()?;
                self.launch(&resources.interp_t, samples, channels)
            }
        }
    }

    fn launch(
        &self,
        matrix: &DeviceMatrix<R>,
        x: &[Complex128],
        channels: usize,
    ) -> Result<Vec<Complex128>> {
        let x = self.client.to_device(x)?;
        let y = self
            .client
            .spmm(matrix, &x, channels, self.options.launch_config())?;
        self.client.synchronize();
        self.client.from_device(&y)
    }
}

fn host_spmm(matrix: &CsrMatrix, x: &[Complex128], channels: usize) -> Vec<Complex128> {
    trace!(rows = matrix.shape[0], channels, "host spmm");
    let mut y = vec![Complex128::ZERO; matrix.shape[0] * channels];
    kernels::serial_spmm(&matrix.view(), x, channels, &mut y);
    y
}
