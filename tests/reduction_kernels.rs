//! Integration tests for scalar and vector SpMV launches on the CPU runtime

mod common;

use common::{assert_allclose_c128, create_cpu_client, dense_spmm, random_complex, random_samples, rng};
use nufft::prelude::*;

fn launches() -> Vec<LaunchConfig> {
    let mut configs = vec![LaunchConfig::scalar()];
    for w in [1, 2, 4, 16, 32, 64, 256] {
        configs.push(LaunchConfig::vector(GroupWidth::new(w).unwrap()));
    }
    configs
}

#[test]
fn test_every_format_and_width_matches_dense() {
    let (client, _device) = create_cpu_client();
    let mut r = rng(1);
    let samples = random_samples(&mut r, 40, 2);
    let plan = Plan::new(&samples, &[6, 8], &[12, 16], &[5, 3], &PlanOptions::default()).unwrap();
    let dense = plan.interp().to_dense();
    let shape = plan.interp().shape();

    for channels in [1, 3] {
        let x = random_complex(&mut r, shape[1] * channels);
        let expected = dense_spmm(&dense, shape, &x, channels);
        let xb = client.to_device(&x).unwrap();

        let matrices = [
            DeviceMatrix::<CpuRuntime>::upload_csr(&client, plan.interp()).unwrap(),
            DeviceMatrix::<CpuRuntime>::upload_ell(&client, plan.ell()).unwrap(),
            DeviceMatrix::<CpuRuntime>::upload_kronecker(&client, plan.kronecker().unwrap())
                .unwrap(),
        ];
        for matrix in &matrices {
            for config in launches() {
                let y = client.spmm(matrix, &xb, channels, config).unwrap();
                let y = client.from_device(&y).unwrap();
                assert_allclose_c128(
                    &y,
                    &expected,
                    1e-10,
                    1e-12,
                    &format!("{} {:?} channels={}", matrix.format(), config, channels),
                );
            }
        }
    }
}

#[test]
fn test_adjoint_matrix_with_uneven_rows() {
    // Columns of the interpolation matrix collect different numbers of samples
    let (client, _device) = create_cpu_client();
    let mut r = rng(2);
    let samples = random_samples(&mut r, 17, 2);
    let plan = Plan::new(&samples, &[4, 4], &[8, 8], &[3, 3], &PlanOptions::default()).unwrap();
    let at = plan.interp_t();
    assert_eq!(at.fixed_degree(), None);

    let x = random_complex(&mut r, 17 * 2);
    let expected = dense_spmm(&at.to_dense(), at.shape(), &x, 2);
    let matrix = DeviceMatrix::<CpuRuntime>::upload_csr(&client, at).unwrap();
    let xb = client.to_device(&x).unwrap();
    for config in launches() {
        let y = client.from_device(&client.spmm(&matrix, &xb, 2, config).unwrap()).unwrap();
        assert_allclose_c128(&y, &expected, 1e-10, 1e-12, &format!("{:?}", config));
    }
}

#[test]
fn test_spmv_is_single_channel_spmm() {
    let (client, _device) = create_cpu_client();
    let csr = CsrMatrix::new(
        vec![0, 2, 2, 3],
        vec![0, 2, 1],
        vec![
            Complex128::new(1.0, 1.0),
            Complex128::from(2.0),
            Complex128::new(0.0, -1.0),
        ],
        [3, 3],
    )
    .unwrap();
    let matrix = DeviceMatrix::<CpuRuntime>::upload_csr(&client, &csr).unwrap();
    let x = client
        .to_device(&[Complex128::ONE, Complex128::I, Complex128::from(3.0)])
        .unwrap();
    let y = client
        .from_device(&client.spmv(&matrix, &x, LaunchConfig::default()).unwrap())
        .unwrap();
    assert_eq!(
        y,
        vec![
            Complex128::new(7.0, 1.0),
            Complex128::ZERO,
            Complex128::from(1.0),
        ]
    );
}

#[test]
fn test_launch_validation() {
    let (client, _device) = create_cpu_client();
    assert!(GroupWidth::new(0).is_err());
    assert!(GroupWidth::new(48).is_err());
    assert!(GroupWidth::new(512).is_err());

    let csr = CsrMatrix::new(vec![0, 1], vec![0], vec![Complex128::ONE], [1, 2]).unwrap();
    let matrix = DeviceMatrix::<CpuRuntime>::upload_csr(&client, &csr).unwrap();
    let x = client.to_device(&[Complex128::ONE; 3]).unwrap();
    assert!(matches!(
        client.spmm(&matrix, &x, 1, LaunchConfig::default()),
        Err(Error::ShapeMismatch { .. })
    ));
    assert!(matches!(
        client.spmm(&matrix, &x, 0, LaunchConfig::default()),
        Err(Error::InvalidArgument { .. })
    ));
}
