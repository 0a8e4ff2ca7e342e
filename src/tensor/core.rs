//! Core Tensor implementation: struct, creation, getters

use crate::dtype::Complex128;
use crate::error::{Error, Result};

/// Contiguous row-major complex array
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<Complex128>,
}

impl Tensor {
    /// Create a tensor from owned data
    ///
    /// Returns an error if `data.len()` does not equal the product of the
    /// `shape` dimensions.
    pub fn from_vec(data: Vec<Complex128>, shape: &[usize]) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Self {
            shape: shape.to_vec(),
            data,
        })
    }

    /// Create a tensor by copying a slice
    pub fn from_slice(data: &[Complex128], shape: &[usize]) -> Result<Self> {
        Self::from_vec(data.to_vec(), shape)
    }

    /// Create a tensor from real values (imaginary parts zero)
    pub fn from_real(data: &[f64], shape: &[usize]) -> Result<Self> {
        Self::from_vec(data.iter().map(|&re| Complex128::from(re)).collect(), shape)
    }

    /// Create a tensor filled with `value`
    pub fn full(shape: &[usize], value: Complex128) -> Self {
        let len: usize = shape.iter().product();
        Self {
            shape: shape.to_vec(),
            data: vec![value; len],
        }
    }

    /// Create a zero-filled tensor
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, Complex128::ZERO)
    }

    /// Create a tensor filled with ones
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, Complex128::ONE)
    }

    /// Returns the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Borrow the elements in row-major order
    #[inline]
    pub fn as_slice(&self) -> &[Complex128] {
        &self.data
    }

    /// Mutably borrow the elements in row-major order
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Complex128] {
        &mut self.data
    }

    /// Copy the elements out
    pub fn to_vec(&self) -> Vec<Complex128> {
        self.data.clone()
    }

    /// Consume the tensor, returning its elements
    pub fn into_vec(self) -> Vec<Complex128> {
        self.data
    }

    /// Reinterpret with a new shape holding the same number of elements
    pub fn reshape(self, shape: &[usize]) -> Result<Self> {
        Self::from_vec(self.data, shape)
    }

    /// Inner product `sum(self * conj(other))`
    pub fn vdot(&self, other: &Tensor) -> Result<Complex128> {
        if self.numel() != other.numel() {
            return Err(Error::shape_mismatch(&self.shape, &other.shape));
        }
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| a * b.conj())
            .sum())
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.data
            .iter()
            .map(|z| z.magnitude_squared())
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_validates_length() {
        let err = Tensor::from_vec(vec![Complex128::ONE; 5], &[2, 3]).unwrap_err();
        assert_eq!(err, Error::shape_mismatch(&[2, 3], &[5]));

        let t = Tensor::from_vec(vec![Complex128::ONE; 6], &[2, 3]).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.ndim(), 2);
        assert_eq!(t.numel(), 6);
    }

    #[test]
    fn test_reshape_keeps_data() {
        let t = Tensor::from_real(&[1.0, 2.0, 3.0, 4.0], &[4]).unwrap();
        let r = t.clone().reshape(&[2, 2, 1]).unwrap();
        assert_eq!(r.shape(), &[2, 2, 1]);
        assert_eq!(r.as_slice(), t.as_slice());
        assert!(t.reshape(&[3]).is_err());
    }

    #[test]
    fn test_vdot_and_norm() {
        let a = Tensor::from_slice(&[Complex128::new(1.0, 1.0), Complex128::new(0.0, 2.0)], &[2])
            .unwrap();
        // <a, a> = |a|²
        let d = a.vdot(&a).unwrap();
        assert!((d.re - 6.0).abs() < 1e-12);
        assert!(d.im.abs() < 1e-12);
        assert!((a.norm() - 6.0f64.sqrt()).abs() < 1e-12);
    }
}
