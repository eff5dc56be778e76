//! In-memory tensor: a shape plus row-major values.

use crate::error::{Result, StreamError};
use crate::scalar::FileScalar;

/// Row-major tensor; the last axis varies fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<N> {
    shape: Vec<usize>,
    values: Vec<N>,
}

impl<N: FileScalar> Tensor<N> {
    /// Create a tensor, checking `product(shape) == values.len()`.
    pub fn new(shape: Vec<usize>, values: Vec<N>) -> Result<Self> {
        if shape.is_empty() {
            return Err(StreamError::Shape("shape must have at least one dimension".into()));
        }
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(StreamError::Shape(format!(
                "shape {:?} holds {} elements but {} values were given",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Self { shape, values })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[N] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<N>) {
        (self.shape, self.values)
    }
}
