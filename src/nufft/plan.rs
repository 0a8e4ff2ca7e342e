//! Transform plan: immutable geometry, scaling, and interpolation operators

use tracing::debug;

use super::designer::{KaiserBesselDesigner, KernelDesign, KernelDesigner};
use crate::dtype::Complex128;
use crate::error::{Error, Result};
use crate::sparse::{CsrMatrix, EllMatrix, KroneckerMatrix, SparseStorage};

/// Options for plan construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Axes transformed by the grid FFT (default: all axes)
    ///
    /// Sorted and de-duplicated during construction.
    pub ft_axes: Option<Vec<usize>>,

    /// Number of channels transformed together (default: none)
    ///
    /// When set, transform inputs carry a trailing channel axis of this size.
    pub batch: Option<usize>,
}

impl PlanOptions {
    /// Set the transformed axes
    pub fn with_ft_axes(mut self, axes: Vec<usize>) -> Self {
        self.ft_axes = Some(axes);
        self
    }

    /// Set the channel count
    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = Some(batch);
        self
    }
}

/// Immutable record describing one NUFFT geometry
///
/// Built once from sample coordinates and geometry through a
/// [`KernelDesigner`]. Shared between threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Plan {
    nd: Vec<usize>,
    kd: Vec<usize>,
    jd: Vec<usize>,
    m: usize,
    batch: usize,
    batched: bool,
    scaling: Vec<Complex128>,
    interp: CsrMatrix,
    interp_t: CsrMatrix,
    ell: EllMatrix,
    kronecker: Option<KroneckerMatrix>,
    index_map: Vec<u32>,
    ft_axes: Vec<usize>,
}

impl Plan {
    /// Build a plan with the Kaiser-Bessel designer
    ///
    /// `samples` holds `M × ndims` coordinates, row-major, in radians.
    pub fn new(
        samples: &[f64],
        nd: &[usize],
        kd: &[usize],
        jd: &[usize],
        options: &PlanOptions,
    ) -> Result<Self> {
        Self::build(&KaiserBesselDesigner, samples, nd, kd, jd, options)
    }

    /// Build a plan with a custom designer
    ///
    /// # Errors
    ///
    /// `InvalidPlan` if the geometry is malformed or the designer output is
    /// degenerate. Designer errors are passed through.
    pub fn build<D: KernelDesigner + ?Sized>(
        designer: &D,
        samples: &[f64],
        nd: &[usize],
        kd: &[usize],
        jd: &[usize],
        options: &PlanOptions,
    ) -> Result<Self> {
        validate_geometry(samples, nd, kd, jd)?;
        let ndims = nd.len();
        let m = samples.len() / ndims;

        let ft_axes = match &options.ft_axes {
            None => (0..ndims).collect(),
            Some(axes) => {
                let mut axes = axes.clone();
                axes.sort_unstable();
                axes.dedup();
                if let Some(&bad) = axes.iter().find(|&&a| a >= ndims) {
                    return Err(Error::invalid_plan(format!(
                        "ft axis {} out of range for {} dimensions",
                        bad, ndims
                    )));
                }
                axes
            }
        };

        let (batch, batched) = match options.batch {
            Some(0) => return Err(Error::invalid_plan("batch must be at least 1")),
            Some(b) => (b, true),
            None => (1, false),
        };

        let design = designer.design(samples, nd, kd, jd)?;
        let KernelDesign {
            scaling,
            interp,
            factors,
        } = design;
        validate_design(&scaling, &interp, m, nd, kd, jd)?;

        let ell = interp.to_ell()?;
        let kronecker = match factors {
            Some(factors) => {
                if factors.iter().map(|f| f.width).ne(jd.iter().copied()) {
                    return Err(Error::invalid_plan("designer factor widths differ from Jd"));
                }
                let kron = KroneckerMatrix::from_axis_factors(&factors, kd)
                    .map_err(|e| Error::invalid_plan(format!("malformed axis factors: {}", e)))?;
                if kron.nrows() != m {
                    return Err(Error::invalid_plan(format!(
                        "axis factors describe {} rows, expected {}",
                        kron.nrows(),
                        m
                    )));
                }
                if !reproduces(&kron.to_csr()?, &interp) {
                    return Err(Error::invalid_plan(
                        "axis factors do not reproduce the interpolation matrix",
                    ));
                }
                Some(kron)
            }
            None => None,
        };
        let interp_t = interp.conj_transpose();
        let index_map = build_index_map(nd, kd);

        debug!(
            ?nd,
            ?kd,
            ?jd,
            samples = m,
            batch,
            nnz = interp.nnz(),
            kronecker = kronecker.is_some(),
            "built NUFFT plan"
        );

        Ok(Self {
            nd: nd.to_vec(),
            kd: kd.to_vec(),
            jd: jd.to_vec(),
            m,
            batch,
            batched,
            scaling: scaling.into_iter().map(Complex128::from).collect(),
            interp,
            interp_t,
            ell,
            kronecker,
            index_map,
            ft_axes,
        })
    }

    /// Image-domain sizes
    pub fn nd(&self) -> &[usize] {
        &self.nd
    }

    /// Oversampled grid sizes
    pub fn kd(&self) -> &[usize] {
        &self.kd
    }

    /// Interpolation widths
    pub fn jd(&self) -> &[usize] {
        &self.jd
    }

    /// Number of dimensions
    #[inline]
    pub fn ndims(&self) -> usize {
        self.nd.len()
    }

    /// Number of samples
    #[inline]
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of channels (1 when no batch was requested)
    #[inline]
    pub fn batch(&self) -> usize {
        self.batch
    }

    /// Whether transform shapes carry a channel axis
    #[inline]
    pub fn batched(&self) -> bool {
        self.batched
    }

    /// `prod(Nd)`
    pub fn image_len(&self) -> usize {
        self.nd.iter().product()
    }

    /// `prod(Kd)`
    pub fn grid_len(&self) -> usize {
        self.kd.iter().product()
    }

    /// Apodization scaling, `prod(Nd)` values
    pub fn scaling(&self) -> &[Complex128] {
        &self.scaling
    }

    /// Forward (degridding) operator
    pub fn interp(&self) -> &CsrMatrix {
        &self.interp
    }

    /// Adjoint (gridding) operator
    pub fn interp_t(&self) -> &CsrMatrix {
        &self.interp_t
    }

    /// Fixed-degree copy of the forward operator
    pub fn ell(&self) -> &EllMatrix {
        &self.ell
    }

    /// Dimension-factored copy of the forward operator, if the designer
    /// reported factors
    pub fn kronecker(&self) -> Option<&KroneckerMatrix> {
        self.kronecker.as_ref()
    }

    /// Linear grid index of every linear image index
    pub fn index_map(&self) -> &[u32] {
        &self.index_map
    }

    /// Axes transformed by the grid FFT
    pub fn ft_axes(&self) -> &[usize] {
        &self.ft_axes
    }

    /// Image shape of transform inputs: `Nd` or `Nd + (batch,)`
    pub fn image_shape(&self) -> Vec<usize> {
        self.with_channels(&self.nd)
    }

    /// Grid shape: `Kd` or `Kd + (batch,)`
    pub fn grid_shape(&self) -> Vec<usize> {
        self.with_channels(&self.kd)
    }

    /// Sample shape: `(M,)` or `(M, batch)`
    pub fn sample_shape(&self) -> Vec<usize> {
        self.with_channels(&[self.m])
    }

    fn with_channels(&self, base: &[usize]) -> Vec<usize> {
        let mut shape = base.to_vec();
        if self.batched {
            shape.push(self.batch);
        }
        shape
    }
}

fn validate_geometry(samples: &[f64], nd: &[usize], kd: &[usize], jd: &[usize]) -> Result<()> {
    let ndims = nd.len();
    if ndims == 0 {
        return Err(Error::invalid_plan("Nd must have at least one dimension"));
    }
    if kd.len() != ndims || jd.len() != ndims {
        return Err(Error::invalid_plan(format!(
            "Nd, Kd, Jd lengths differ: {}, {}, {}",
            ndims,
            kd.len(),
            jd.len()
        )));
    }
    for d in 0..ndims {
        if nd[d] == 0 || jd[d] == 0 {
            return Err(Error::invalid_plan(format!(
                "zero size on axis {}: Nd={}, Jd={}",
                d, nd[d], jd[d]
            )));
        }
        if kd[d] < nd[d] {
            return Err(Error::invalid_plan(format!(
                "Kd[{}]={} is smaller than Nd[{}]={}",
                d, kd[d], d, nd[d]
            )));
        }
        if jd[d] > kd[d] {
            return Err(Error::invalid_plan(format!(
                "Jd[{}]={} exceeds Kd[{}]={}",
                d, jd[d], d, kd[d]
            )));
        }
    }
    let fits_u32 = kd
        .iter()
        .try_fold(1usize, |acc, &k| acc.checked_mul(k))
        .is_some_and(|n| u32::try_from(n).is_ok());
    if !fits_u32 {
        return Err(Error::invalid_plan(format!(
            "grid {:?} exceeds the u32 index range",
            kd
        )));
    }
    if samples.is_empty() || samples.len() % ndims != 0 {
        return Err(Error::invalid_plan(format!(
            "{} coordinates do not form M x {} samples with M > 0",
            samples.len(),
            ndims
        )));
    }
    if let Some(pos) = samples.iter().position(|w| !w.is_finite()) {
        return Err(Error::invalid_plan(format!(
            "sample coordinate {} is not finite",
            pos
        )));
    }
    Ok(())
}

fn validate_design(
    scaling: &[f64],
    interp: &CsrMatrix,
    m: usize,
    nd: &[usize],
    kd: &[usize],
    jd: &[usize],
) -> Result<()> {
    let image_len: usize = nd.iter().product();
    if scaling.len() != image_len {
        return Err(Error::invalid_plan(format!(
            "scaling has {} values, expected {}",
            scaling.len(),
            image_len
        )));
    }
    if let Some(pos) = scaling.iter().position(|&s| !(s > 0.0 && s.is_finite())) {
        return Err(Error::invalid_plan(format!(
            "scaling[{}] = {} is not strictly positive",
            pos, scaling[pos]
        )));
    }
    let expected = [m, kd.iter().product()];
    if interp.shape() != expected {
        return Err(Error::invalid_plan(format!(
            "interpolation matrix is {:?}, expected {:?}",
            interp.shape(),
            expected
        )));
    }
    let degree: usize = jd.iter().product();
    if interp.fixed_degree() != Some(degree) {
        return Err(Error::invalid_plan(format!(
            "interpolation rows must each store {} entries",
            degree
        )));
    }
    Ok(())
}

/// Whether an expanded Kronecker matrix matches `interp` entry for entry
///
/// Columns must agree exactly, values within a relative tolerance of the
/// largest weight.
fn reproduces(expanded: &CsrMatrix, interp: &CsrMatrix) -> bool {
    if expanded.col_indices() != interp.col_indices() {
        return false;
    }
    let scale = interp
        .values()
        .iter()
        .map(|v| v.magnitude())
        .fold(0.0f64, f64::max);
    let tol = 1e-10 * scale;
    expanded
        .values()
        .iter()
        .zip(interp.values())
        .all(|(&a, &b)| (a - b).magnitude() <= tol)
}

/// Zero-padding placement: image index -> grid index, image in the low corner
fn build_index_map(nd: &[usize], kd: &[usize]) -> Vec<u32> {
    let ndims = nd.len();
    let image_len: usize = nd.iter().product();
    let mut grid_strides = vec![1usize; ndims];
    for d in (0..ndims - 1).rev() {
        grid_strides[d] = grid_strides[d + 1] * kd[d + 1];
    }

    let mut map = Vec::with_capacity(image_len);
    let mut digits = vec![0usize; ndims];
    for _ in 0..image_len {
        let g: usize = digits.iter().zip(&grid_strides).map(|(n, s)| n * s).sum();
        map.push(g as u32);
        for d in (0..ndims).rev() {
            digits[d] += 1;
            if digits[d] < nd[d] {
                break;
            }
            digits[d] = 0;
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(m: usize, ndims: usize) -> Vec<f64> {
        (0..m * ndims)
            .map(|i| ((i as f64 * 0.618_033_988_7).fract() - 0.5) * 2.0 * std::f64::consts::PI)
            .collect()
    }

    #[test]
    fn test_index_map_low_corner() {
        let map = build_index_map(&[2, 3], &[4, 5]);
        assert_eq!(map, vec![0, 1, 2, 5, 6, 7]);
    }

    #[test]
    fn test_plan_shapes() {
        let plan = Plan::new(
            &samples(10, 2),
            &[8, 8],
            &[16, 16],
            &[4, 4],
            &PlanOptions::default(),
        )
        .unwrap();
        assert_eq!(plan.m(), 10);
        assert_eq!(plan.batch(), 1);
        assert!(!plan.batched());
        assert_eq!(plan.image_shape(), vec![8, 8]);
        assert_eq!(plan.sample_shape(), vec![10]);
        assert_eq!(plan.ft_axes(), &[0, 1]);
        assert_eq!(plan.interp_t().shape(), [256, 10]);
        assert_eq!(plan.ell().degree(), 16);
        assert_eq!(plan.kronecker().map(|k| k.sum_jd()), Some(8));

        let batched = Plan::new(
            &samples(10, 2),
            &[8, 8],
            &[16, 16],
            &[4, 4],
            &PlanOptions::default().with_batch(3).with_ft_axes(vec![1, 0, 1]),
        )
        .unwrap();
        assert_eq!(batched.image_shape(), vec![8, 8, 3]);
        assert_eq!(batched.grid_shape(), vec![16, 16, 3]);
        assert_eq!(batched.sample_shape(), vec![10, 3]);
        assert_eq!(batched.ft_axes(), &[0, 1]);
    }

    #[test]
    fn test_plan_rejects_bad_geometry() {
        let s = samples(4, 2);
        let opts = PlanOptions::default();
        let cases: [(&[usize], &[usize], &[usize]); 5] = [
            (&[8, 8], &[16], &[4, 4]),
            (&[8, 8], &[16, 4], &[4, 4]),
            (&[8, 8], &[16, 16], &[4, 32]),
            (&[8, 0], &[16, 16], &[4, 4]),
            (&[8, 8], &[16, 16], &[4, 0]),
        ];
        for (nd, kd, jd) in cases {
            assert!(matches!(
                Plan::new(&s, nd, kd, jd, &opts),
                Err(Error::InvalidPlan { .. })
            ));
        }

        let bad_axes = PlanOptions::default().with_ft_axes(vec![2]);
        assert!(Plan::new(&s, &[8, 8], &[16, 16], &[4, 4], &bad_axes).is_err());
        let zero_batch = PlanOptions::default().with_batch(0);
        assert!(Plan::new(&s, &[8, 8], &[16, 16], &[4, 4], &zero_batch).is_err());
        assert!(Plan::new(&s[..7], &[8, 8], &[16, 16], &[4, 4], &opts).is_err());
        assert!(Plan::new(&[], &[8, 8], &[16, 16], &[4, 4], &opts).is_err());
        let mut nan = s.clone();
        nan[3] = f64::NAN;
        assert!(Plan::new(&nan, &[8, 8], &[16, 16], &[4, 4], &opts).is_err());
    }

    struct NegativeScaling;

    impl KernelDesigner for NegativeScaling {
        fn design(
            &self,
            samples: &[f64],
            nd: &[usize],
            kd: &[usize],
            jd: &[usize],
        ) -> Result<KernelDesign> {
            let mut design = KaiserBesselDesigner.design(samples, nd, kd, jd)?;
            design.scaling[0] = -1.0;
            Ok(design)
        }
    }

    struct ReversedFactor;

    impl KernelDesigner for ReversedFactor {
        fn design(
            &self,
            samples: &[f64],
            nd: &[usize],
            kd: &[usize],
            jd: &[usize],
        ) -> Result<KernelDesign> {
            let mut design = KaiserBesselDesigner.design(samples, nd, kd, jd)?;
            if let Some(factors) = design.factors.as_mut() {
                factors[0].weights.reverse();
            }
            Ok(design)
        }
    }

    #[test]
    fn test_plan_rejects_factors_that_disagree_with_interp() {
        let err = Plan::build(
            &ReversedFactor,
            &samples(6, 2),
            &[8, 8],
            &[16, 16],
            &[4, 4],
            &PlanOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::invalid_plan("axis factors do not reproduce the interpolation matrix")
        );

        // the unmodified designer passes the same check
        let plan = Plan::new(&samples(6, 2), &[8, 8], &[16, 16], &[4, 4], &PlanOptions::default())
            .unwrap();
        assert!(plan.kronecker().is_some());
    }

    #[test]
    fn test_plan_rejects_degenerate_design() {
        let err = Plan::build(
            &NegativeScaling,
            &samples(4, 1),
            &[8],
            &[16],
            &[4],
            &PlanOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidPlan { .. }));
    }
}
