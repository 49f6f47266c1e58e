// archgrad-core/src/ops/reduction/mod.rs

pub mod max;
pub mod mean;

pub use max::max_reduce_op;
pub use mean::mean_reduce_op;

use crate::error::ArchGradError;
use crate::ops::view::utils::normalize_axis;
use crate::tensor::utils::axis_blocks;
use crate::tensor::Tensor;

/// Index arithmetic for reducing groups of `count` consecutive elements along
/// one axis of length `len` (`len / count` groups).
#[derive(Debug)]
pub(crate) struct GroupLayout {
    pub(crate) outer: usize,
    pub(crate) len: usize,
    pub(crate) inner: usize,
    pub(crate) count: usize,
}

impl GroupLayout {
    /// Validates `axis` and `count` against `x` and returns the layout together
    /// with the reduced output shape.
    pub(crate) fn new(
        x: &Tensor,
        axis: isize,
        count: usize,
        operation: &str,
    ) -> Result<(Self, Vec<usize>), ArchGradError> {
        let mut shape = x.shape();
        let axis = normalize_axis(axis, shape.len(), operation)?;
        let (outer, len, inner) = axis_blocks(&shape, axis);
        if count == 0 || len % count != 0 {
            return Err(ArchGradError::IndivisibleSplit {
                length: len,
                count,
                operation: operation.to_string(),
            });
        }
        shape[axis] = len / count;
        Ok((
            GroupLayout {
                outer,
                len,
                inner,
                count,
            },
            shape,
        ))
    }

    pub(crate) fn output_len(&self) -> usize {
        self.outer * (self.len / self.count) * self.inner
    }

    /// Input offsets of the `count` members of the group feeding output element `out`.
    pub(crate) fn members(&self, out: usize) -> impl Iterator<Item = usize> {
        let groups = self.len / self.count;
        let k = out % self.inner;
        let g = (out / self.inner) % groups;
        let o = out / (self.inner * groups);
        let base = o * self.len * self.inner + g * self.count * self.inner + k;
        let inner = self.inner;
        (0..self.count).map(move |r| base + r * inner)
    }
}

#[cfg(test)]
#[path = "reduction_test.rs"]
mod tests;
