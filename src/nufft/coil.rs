//! Channel (coil) profile: broadcast a single image over channels and
//! combine channels back

use super::{NufftOperator, Plan};
use crate::algorithm::fft::FftAlgorithms;
use crate::algorithm::spmv::SpmvAlgorithms;
use crate::dtype::Complex128;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// All-ones profile of shape `Nd + (batch,)`
pub(crate) fn default_profile(plan: &Plan) -> Tensor {
    let mut shape = plan.nd().to_vec();
    shape.push(plan.batch());
    Tensor::ones(&shape)
}

/// `x[i] * profile[i, c]` for every channel `c`
pub(crate) fn broadcast(x: &[Complex128], profile: &[Complex128], channels: usize) -> Vec<Complex128> {
    profile
        .chunks_exact(channels)
        .zip(x)
        .flat_map(|(p, &v)| p.iter().map(move |&s| v * s))
        .collect()
}

/// `mean_c(x[i, c] * conj(profile[i, c]))`
pub(crate) fn combine(x: &[Complex128], profile: &[Complex128], channels: usize) -> Vec<Complex128> {
    let inv = 1.0 / channels as f64;
    x.chunks_exact(channels)
        .zip(profile.chunks_exact(channels))
        .map(|(xc, pc)| {
            xc.iter()
                .zip(pc)
                .map(|(&a, &s)| a * s.conj())
                .sum::<Complex128>()
                * inv
        })
        .collect()
}

impl<R: Runtime> NufftOperator<R>
where
    R::Client: SpmvAlgorithms<R> + FftAlgorithms<R>,
{
    /// Replace the channel profile
    ///
    /// # Errors
    ///
    /// `Configuration` if `profile` is not shaped `Nd + (batch,)`; the
    /// previous profile stays in place.
    pub fn set_channel_profile(&mut self, profile: Tensor) -> Result<()> {
        if profile.shape() != self.profile.shape() {
            return Err(Error::configuration(format!(
                "channel profile shape {:?} does not match {:?}",
                profile.shape(),
                self.profile.shape()
            )));
        }
        self.profile = profile;
        Ok(())
    }

    /// Restore the all-ones profile
    pub fn reset_channel_profile(&mut self) {
        self.profile = default_profile(&self.plan);
    }

    /// Current channel profile, shape `Nd + (batch,)`
    pub fn channel_profile(&self) -> &Tensor {
        &self.profile
    }

    /// Weight a single-channel image by the profile and run the batched forward
    pub fn broadcast_forward(&self, x: &Tensor) -> Result<Tensor> {
        self.check_exact(x, self.plan.nd())?;
        let batch = self.plan.batch();
        let x2 = broadcast(x.as_slice(), self.profile.as_slice(), batch);
        let y = self.forward_flat(&x2, batch)?;
        Tensor::from_vec(y, &self.plan.sample_shape())
    }

    /// Run the batched adjoint and combine channels with the conjugate profile
    pub fn combine_adjoint(&self, y: &Tensor) -> Result<Tensor> {
        self.check_input(y, &[self.plan.m()])?;
        let batch = self.plan.batch();
        let x = self.adjoint_flat(y.as_slice(), batch)?;
        let combined = combine(&x, self.profile.as_slice(), batch);
        Tensor::from_vec(combined, self.plan.nd())
    }

    /// `combine_adjoint(broadcast_forward(x))`
    pub fn normal_combined(&self, x: &Tensor) -> Result<Tensor> {
        self.check_exact(x, self.plan.nd())?;
        let batch = self.plan.batch();
        let x2 = broadcast(x.as_slice(), self.profile.as_slice(), batch);
        let y = self.forward_flat(&x2, batch)?;
        let back = self.adjoint_flat(&y, batch)?;
        let combined = combine(&back, self.profile.as_slice(), batch);
        Tensor::from_vec(combined, self.plan.nd())
    }
}
