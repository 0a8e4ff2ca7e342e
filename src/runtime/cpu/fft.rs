//! FftAlgorithms implementation for the CPU runtime

use super::client::{CpuBuffer, CpuClient};
use super::kernels;
use super::runtime::CpuRuntime;
use crate::algorithm::fft::{FftAlgorithms, FftDirection, FftNormalization, validate_fft_axes};
use crate::dtype::Complex128;
use crate::error::{Error, Result};
use tracing::trace;

impl FftAlgorithms<CpuRuntime> for CpuClient {
    fn fftn(
        &self,
        data: &mut CpuBuffer<Complex128>,
        shape: &[usize],
        axes: &[usize],
        direction: FftDirection,
        norm: FftNormalization,
    ) -> Result<()> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(Error::shape_mismatch(shape, &[data.len()]));
        }
        validate_fft_axes(shape, axes)?;

        trace!(?shape, ?axes, ?direction, ?norm, "fftn launch");

        let inverse = direction == FftDirection::Inverse;
        for &axis in axes {
            let factor = norm.factor(direction, shape[axis]);
            kernels::fft_axis_c128(data.as_mut_slice(), shape, axis, inverse, factor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fftn_ortho_round_trip_keeps_channel_axis() {
        let client = CpuClient::default();
        // (6, 4) grid with 2 interleaved channels, transform the first two axes
        let shape = [6, 4, 2];
        let host: Vec<Complex128> = (0..48)
            .map(|k| Complex128::new((k as f64 * 0.37).sin(), (k as f64 * 0.11).cos()))
            .collect();
        let mut buf = CpuBuffer::from_vec(host.clone());

        client
            .fftn(&mut buf, &shape, &[0, 1], FftDirection::Forward, FftNormalization::Ortho)
            .unwrap();
        // Parseval holds per channel under Ortho
        for c in 0..2 {
            let e_in: f64 = host.iter().skip(c).step_by(2).map(|z| z.magnitude_squared()).sum();
            let e_out: f64 = buf
                .as_slice()
                .iter()
                .skip(c)
                .step_by(2)
                .map(|z| z.magnitude_squared())
                .sum();
            assert!((e_in - e_out).abs() < 1e-10);
        }

        client
            .fftn(&mut buf, &shape, &[0, 1], FftDirection::Inverse, FftNormalization::Ortho)
            .unwrap();
        for (a, b) in buf.as_slice().iter().zip(&host) {
            assert!((*a - *b).magnitude() < 1e-12);
        }
    }

    #[test]
    fn test_fftn_validates() {
        let client = CpuClient::default();
        let mut buf = CpuBuffer::zeroed(8);
        let dir = FftDirection::Forward;
        let norm = FftNormalization::Ortho;
        assert!(client.fftn(&mut buf, &[3, 3], &[0], dir, norm).is_err());
        assert!(client.fftn(&mut buf, &[4, 2], &[2], dir, norm).is_err());
        assert!(client.fftn(&mut buf, &[4, 2], &[0, 1], dir, norm).is_ok());
    }
}
