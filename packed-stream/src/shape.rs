//! Shape decomposition into outer positions and the packable inner axis.

use crate::error::{Result, StreamError};

/// Outer/inner split of a tensor shape.
///
/// `outer` is the product of every axis but the last; `inner` is the last
/// axis divided by `multi_pixel_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSplit {
    pub outer: usize,
    pub inner: usize,
    pub multi_pixel_out: usize,
}

impl AxisSplit {
    /// Elements per outer position (`inner * multi_pixel_out`).
    pub fn inner_full(&self) -> usize {
        self.inner * self.multi_pixel_out
    }

    pub fn num_elements(&self) -> usize {
        self.outer * self.inner_full()
    }

    /// Width of one packed word for `elem_bits`-wide slots.
    pub fn word_bits(&self, elem_bits: u32) -> usize {
        self.inner_full() * elem_bits as usize
    }
}

/// Split `shape` into outer positions and `multi_pixel_out` inner blocks.
///
/// A rank-1 shape has a single outer position. A last axis that is not a
/// multiple of `multi_pixel_out` is rejected rather than truncated.
pub fn decompose(shape: &[usize], multi_pixel_out: usize) -> Result<AxisSplit> {
    let (&last, outer_dims) = shape
        .split_last()
        .ok_or_else(|| StreamError::Shape("shape must have at least one dimension".into()))?;
    if multi_pixel_out == 0 {
        return Err(StreamError::Shape("multi_pixel_out must be positive".into()));
    }
    if last % multi_pixel_out != 0 {
        return Err(StreamError::ShapeDivisibility {
            last_dim: last,
            multi_pixel_out,
        });
    }
    Ok(AxisSplit {
        outer: outer_dims.iter().product(),
        inner: last / multi_pixel_out,
        multi_pixel_out,
    })
}
