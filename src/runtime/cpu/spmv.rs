//! SpmvAlgorithms implementation for the CPU runtime

use super::client::{CpuBuffer, CpuClient};
use super::helpers::dispatch_group_width;
use super::kernels;
use super::runtime::CpuRuntime;
use crate::algorithm::spmv::{
    DeviceMatrix, LaunchConfig, ReductionStrategy, SpmvAlgorithms, validate_spmm,
};
use crate::dtype::Complex128;
use crate::error::Result;
use crate::sparse::{CsrView, EllView, KroneckerView, RowSource};
use tracing::trace;

impl SpmvAlgorithms<CpuRuntime> for CpuClient {
    fn spmm(
        &self,
        matrix: &DeviceMatrix<CpuRuntime>,
        x: &CpuBuffer<Complex128>,
        channels: usize,
        config: LaunchConfig,
    ) -> Result<CpuBuffer<Complex128>> {
        let shape = matrix.shape();
        validate_spmm(shape, x.len(), channels)?;

        trace!(
            format = %matrix.format(),
            rows = shape[0] * channels,
            strategy = ?config.strategy,
            group_width = config.group_width.get(),
            "spmm launch"
        );

        let mut y = CpuBuffer::zeroed(shape[0] * channels);
        match matrix {
            DeviceMatrix::Csr {
                shape,
                row_ptrs,
                col_indices,
                values,
            } => {
                let view = CsrView {
                    shape: *shape,
                    row_ptrs: row_ptrs.as_slice(),
                    col_indices: col_indices.as_slice(),
                    values: values.as_slice(),
                };
                launch(&view, x.as_slice(), channels, config, y.as_mut_slice())?;
            }
            DeviceMatrix::Ell {
                shape,
                degree,
                col_indices,
                values,
            } => {
                let view = EllView {
                    shape: *shape,
                    degree: *degree,
                    col_indices: col_indices.as_slice(),
                    values: values.as_slice(),
                };
                launch(&view, x.as_slice(), channels, config, y.as_mut_slice())?;
            }
            DeviceMatrix::Kronecker {
                shape,
                ndims,
                sum_jd,
                prod_jd,
                mesh_index,
                kindx,
                udata,
            } => {
                let view = KroneckerView {
                    shape: *shape,
                    ndims: *ndims,
                    sum_jd: *sum_jd,
                    prod_jd: *prod_jd,
                    mesh_index: mesh_index.as_slice(),
                    kindx: kindx.as_slice(),
                    udata: udata.as_slice(),
                };
                launch(&view, x.as_slice(), channels, config, y.as_mut_slice())?;
            }
        }
        Ok(y)
    }
}

/// Run one SpMM over `a` with the configured reduction
///
/// Every width a [`GroupWidth`](crate::algorithm::spmv::GroupWidth) can hold
/// has a dispatch arm, so the `InvalidArgument` fallback is unreachable from
/// the public API.
fn launch<S: RowSource>(
    a: &S,
    x: &[Complex128],
    channels: usize,
    config: LaunchConfig,
    y: &mut [Complex128],
) -> Result<()> {
    match config.strategy {
        ReductionStrategy::Scalar => kernels::scalar_spmm(a, x, channels, y),
        ReductionStrategy::Vector => {
            dispatch_group_width!(config.group_width.get(), W => {
                kernels::vector_spmm::<S, W>(a, x, channels, y)
            })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::spmv::GroupWidth;
    use crate::runtime::RuntimeClient;
    use crate::sparse::{AxisFactor, CsrMatrix, KroneckerMatrix};

    fn factored() -> KroneckerMatrix {
        // 2 rows on a 4 x 4 grid, widths (2, 3)
        let f0 = AxisFactor {
            width: 2,
            columns: vec![0, 1, 3, 0],
            weights: vec![
                Complex128::new(1.0, 0.0),
                Complex128::new(0.5, 0.5),
                Complex128::new(-1.0, 2.0),
                Complex128::new(0.0, 1.0),
            ],
        };
        let f1 = AxisFactor {
            width: 3,
            columns: vec![1, 2, 3, 3, 0, 1],
            weights: (0..6).map(|k| Complex128::new(k as f64, 1.0)).collect(),
        };
        KroneckerMatrix::from_axis_factors(&[f0, f1], &[4, 4]).unwrap()
    }

    #[test]
    fn test_formats_and_strategies_agree() {
        let client = CpuClient::default();
        let kron = factored();
        let csr: CsrMatrix = kron.to_csr().unwrap();
        let ell = csr.to_ell().unwrap();

        let matrices = [
            DeviceMatrix::<CpuRuntime>::upload_csr(&client, &csr).unwrap(),
            DeviceMatrix::<CpuRuntime>::upload_ell(&client, &ell).unwrap(),
            DeviceMatrix::<CpuRuntime>::upload_kronecker(&client, &kron).unwrap(),
        ];
        let channels = 2;
        let host_x: Vec<Complex128> = (0..16 * channels)
            .map(|k| Complex128::new((k as f64).cos(), (k as f64).sin()))
            .collect();
        let x = client.to_device(&host_x).unwrap();

        let mut expected = vec![Complex128::ZERO; 2 * channels];
        kernels::serial_spmm(&csr.view(), &host_x, channels, &mut expected);

        let configs = [
            LaunchConfig::scalar(),
            LaunchConfig::vector(GroupWidth::new(1).unwrap()),
            LaunchConfig::vector(GroupWidth::new(4).unwrap()),
            LaunchConfig::vector(GroupWidth::new(256).unwrap()),
        ];
        for matrix in &matrices {
            for config in configs {
                let y = client.spmm(matrix, &x, channels, config).unwrap();
                client.synchronize();
                for (a, b) in client.from_device(&y).unwrap().iter().zip(&expected) {
                    assert!((*a - *b).magnitude() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_launch_accepts_every_group_width() {
        let csr = factored().to_csr().unwrap();
        let x: Vec<Complex128> = (0..16).map(|k| Complex128::new(k as f64, 0.0)).collect();
        let mut expected = vec![Complex128::ZERO; 2];
        kernels::serial_spmm(&csr.view(), &x, 1, &mut expected);

        let mut width = 1;
        while width <= crate::algorithm::spmv::MAX_GROUP_WIDTH {
            let config = LaunchConfig::vector(GroupWidth::new(width).unwrap());
            let mut y = vec![Complex128::ZERO; 2];
            launch(&csr.view(), &x, 1, config, &mut y).unwrap();
            for (a, b) in y.iter().zip(&expected) {
                assert!((*a - *b).magnitude() < 1e-12);
            }
            width *= 2;
        }
    }

    #[test]
    fn test_spmm_rejects_bad_input() {
        let client = CpuClient::default();
        let csr = factored().to_csr().unwrap();
        let m = DeviceMatrix::<CpuRuntime>::upload_csr(&client, &csr).unwrap();
        let x = client.to_device(&vec![Complex128::ONE; 15]).unwrap();
        assert!(client.spmv(&m, &x, LaunchConfig::default()).is_err());
        let x = client.to_device(&vec![Complex128::ONE; 16]).unwrap();
        assert!(client.spmm(&m, &x, 0, LaunchConfig::default()).is_err());
        assert!(client.spmv(&m, &x, LaunchConfig::default()).is_ok());
    }
}
