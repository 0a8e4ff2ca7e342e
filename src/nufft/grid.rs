//! Grid transform stage: zero-pad / crop and the oversampled FFT

use super::{ExecutionMode, NufftOperator};
use crate::algorithm::fft::{FftAlgorithms, FftDirection, FftNormalization};
use crate::algorithm::spmv::SpmvAlgorithms;
use crate::dtype::Complex128;
use crate::error::Result;
use crate::runtime::cpu::kernels;
use crate::runtime::{Runtime, RuntimeClient};
use crate::tensor::Tensor;

/// Normalization of the grid FFT; keeps forward and inverse mutually adjoint
const GRID_NORM: FftNormalization = FftNormalization::Ortho;

impl<R: Runtime> NufftOperator<R>
where
    R::Client: SpmvAlgorithms<R> + FftAlgorithms<R>,
{
    /// Zero-pad into the `Kd` grid and transform over the plan's FFT axes
    ///
    /// Input `Nd` (+ channels), output `Kd` (+ channels).
    pub fn to_grid(&self, xx: &Tensor) -> Result<Tensor> {
        self.check_input(xx, self.plan.nd())?;
        let k = self.to_grid_flat(xx.as_slice(), self.plan.batch())?;
        Tensor::from_vec(k, &self.plan.grid_shape())
    }

    /// Inverse transform over the plan's FFT axes and crop back to `Nd`
    pub fn from_grid(&self, k: &Tensor) -> Result<Tensor> {
        self.check_input(k, self.plan.kd())?;
        let xx = self.from_grid_flat(k.to_vec(), self.plan.batch())?;
        Tensor::from_vec(xx, &self.plan.image_shape())
    }

    pub(crate) fn to_grid_flat(
        &self,
        image: &[Complex128],
        channels: usize,
    ) -> Result<Vec<Complex128>> {
        let mut grid = vec![Complex128::ZERO; self.plan.grid_len() * channels];
        for (&g, src) in self
            .plan
            .index_map()
            .iter()
            .zip(image.chunks_exact(channels))
        {
            let dst = g as usize * channels;
            grid[dst..dst + channels].copy_from_slice(src);
        }
        self.grid_fft(grid, channels, FftDirection::Forward)
    }

    pub(crate) fn from_grid_flat(
        &self,
        grid: Vec<Complex128>,
        channels: usize,
    ) -> Result<Vec<Complex128>> {
        let grid = self.grid_fft(grid, channels, FftDirection::Inverse)?;
        let mut image = Vec::with_capacity(self.plan.image_len() * channels);
        for &g in self.plan.index_map() {
            let src = g as usize * channels;
            image.extend_from_slice(&grid[src..src + channels]);
        }
        Ok(image)
    }

    /// FFT of a `Kd + (channels,)` buffer over the plan's axes
    pub(crate) fn grid_fft(
        &self,
        mut grid: Vec<Complex128>,
        channels: usize,
        direction: FftDirection,
    ) -> Result<Vec<Complex128>> {
        let mut shape = self.plan.kd().to_vec();
        shape.push(channels);
        let axes = self.plan.ft_axes();

        match self.options.execution {
            ExecutionMode::Host => {
                let inverse = direction == FftDirection::Inverse;
                for &axis in axes {
                    let factor = GRID_NORM.factor(direction, shape[axis]);
                    kernels::fft_axis_c128(&mut grid, &shape, axis, inverse, factor);
                }
                Ok(grid)
            }
            ExecutionMode::Device => {
                self.device()?;
                let mut buf = self.client.to_device(&grid)?;
                self.client
                    .fftn(&mut buf, &shape, axes, direction, GRID_NORM)?;
                self.client.synchronize();
                self.client.from_device(&buf)
            }
        }
    }
}
