//! Integration tests for sparse storage formats and their conversions

mod common;

use common::{random_complex, random_samples, rng};
use nufft::prelude::*;
use nufft::sparse::AxisFactor;

#[test]
fn test_designer_rows_match_kronecker_factors() {
    let mut r = rng(1);
    let samples = random_samples(&mut r, 25, 3);
    let plan = Plan::new(
        &samples,
        &[6, 4, 5],
        &[12, 8, 10],
        &[3, 2, 4],
        &PlanOptions::default(),
    )
    .unwrap();

    let kron = plan.kronecker().unwrap();
    assert_eq!(kron.shape(), [25, 960]);
    assert_eq!(kron.degree(), 24);
    assert_eq!(kron.sum_jd(), 9);
    assert_eq!(kron.nnz(), 25 * 24);

    let expanded = kron.to_csr().unwrap();
    assert_eq!(expanded.col_indices(), plan.interp().col_indices());
    common::assert_allclose_c128(
        expanded.values(),
        plan.interp().values(),
        1e-14,
        0.0,
        "kronecker expansion",
    );
}

#[test]
fn test_ell_and_csr_describe_the_same_matrix() {
    let mut r = rng(2);
    let samples = random_samples(&mut r, 15, 2);
    let plan = Plan::new(&samples, &[6, 6], &[12, 12], &[3, 3], &PlanOptions::default()).unwrap();

    let ell = plan.ell();
    assert_eq!(ell.degree(), 9);
    assert_eq!(ell.format(), SparseFormat::Ell);
    assert_eq!(&ell.to_csr().unwrap(), plan.interp());
    assert_eq!(&plan.interp().to_ell().unwrap(), ell);
    assert_eq!(plan.interp().to_dense(), ell.to_csr().unwrap().to_dense());
}

#[test]
fn test_adjoint_matrix_is_conjugate_transpose() {
    let mut r = rng(3);
    let samples = random_samples(&mut r, 12, 2);
    let plan = Plan::new(&samples, &[4, 5], &[8, 10], &[2, 3], &PlanOptions::default()).unwrap();

    let a = plan.interp().to_dense();
    let at = plan.interp_t().to_dense();
    let [m, n] = plan.interp().shape();
    assert_eq!(plan.interp_t().shape(), [n, m]);
    for i in 0..m {
        for j in 0..n {
            assert_eq!(at[j * m + i], a[i * n + j].conj());
        }
    }
    assert_eq!(plan.interp_t().conj_transpose().to_dense(), a);
}

#[test]
fn test_ragged_csr_has_no_ell_form() {
    let csr = CsrMatrix::new(
        vec![0, 1, 3],
        vec![0, 0, 2],
        vec![Complex128::ONE; 3],
        [2, 3],
    )
    .unwrap();
    assert_eq!(csr.fixed_degree(), None);
    assert!(matches!(
        csr.to_ell(),
        Err(Error::InvalidArgument { .. })
    ));
}

#[test]
fn test_kronecker_rejects_inconsistent_factors() {
    let mut r = rng(4);
    let good = AxisFactor {
        width: 2,
        columns: vec![0, 1, 3, 0],
        weights: random_complex(&mut r, 4),
    };
    let short = AxisFactor {
        width: 2,
        columns: vec![0, 1],
        weights: random_complex(&mut r, 2),
    };
    let out_of_range = AxisFactor {
        width: 2,
        columns: vec![0, 1, 2, 4],
        weights: random_complex(&mut r, 4),
    };

    assert!(KroneckerMatrix::from_axis_factors(&[good.clone(), good.clone()], &[4, 4]).is_ok());
    assert!(KroneckerMatrix::from_axis_factors(&[good.clone()], &[4, 4]).is_err());
    assert!(KroneckerMatrix::from_axis_factors(&[good.clone(), short], &[4, 4]).is_err());
    assert!(KroneckerMatrix::from_axis_factors(&[good, out_of_range], &[4, 4]).is_err());
}

#[test]
fn test_memory_usage_ordering() {
    let mut r = rng(5);
    let samples = random_samples(&mut r, 200, 2);
    let plan = Plan::new(&samples, &[16, 16], &[32, 32], &[6, 6], &PlanOptions::default()).unwrap();

    let csr = plan.interp().memory_usage();
    let ell = plan.ell().memory_usage();
    let kron = plan.kronecker().unwrap().memory_usage();
    assert!(ell < csr);
    assert!(kron < ell);
}
