//! Apodization correction stage

use super::NufftOperator;
use crate::algorithm::fft::FftAlgorithms;
use crate::algorithm::spmv::SpmvAlgorithms;
use crate::dtype::Complex128;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Multiply every channel of image index `i` by `scaling[i]`
pub(crate) fn scale_channels(scaling: &[Complex128], data: &mut [Complex128], channels: usize) {
    debug_assert_eq!(data.len(), scaling.len() * channels);
    for (chunk, &s) in data.chunks_exact_mut(channels).zip(scaling) {
        for v in chunk {
            *v *= s;
        }
    }
}

impl<R: Runtime> NufftOperator<R>
where
    R::Client: SpmvAlgorithms<R> + FftAlgorithms<R>,
{
    /// Multiply by the apodization scaling, broadcast over channels
    ///
    /// The same multiply is the first forward step and the last adjoint
    /// step, so applying it twice yields `x * scaling²`.
    pub fn apply_scaling(&self, x: &Tensor) -> Result<Tensor> {
        self.check_input(x, self.plan.nd())?;
        let mut data = x.to_vec();
        scale_channels(self.plan.scaling(), &mut data, self.plan.batch());
        Tensor::from_vec(data, x.shape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_channels_broadcasts() {
        let scaling = [Complex128::from(2.0), Complex128::from(3.0)];
        let mut data = vec![Complex128::ONE; 4];
        scale_channels(&scaling, &mut data, 2);
        assert_eq!(
            data,
            vec![
                Complex128::from(2.0),
                Complex128::from(2.0),
                Complex128::from(3.0),
                Complex128::from(3.0)
            ]
        );
    }
}
