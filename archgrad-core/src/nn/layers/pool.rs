use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::nn::layer::{check_arity, check_batch_shape, Layer, LayerKind};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Max,
    Average,
}

/// Non-overlapping `size x size` pooling over `[height, width, channels]` samples.
///
/// Implemented as two grouped reductions, first along the rows and then along
/// the columns, so the gradient routing is that of the reduce operations.
#[derive(Debug)]
pub struct Pool {
    kind: PoolKind,
    size: usize,
    input_shape: Vec<usize>,
    output_shape: Vec<usize>,
}

impl Pool {
    /// # Errors
    /// `RankTooLow` unless the input is rank 3, `IndivisibleSplit` if `size`
    /// does not divide the height and width.
    pub fn new(kind: PoolKind, size: usize, input_shape: &[usize]) -> Result<Self, ArchGradError> {
        if input_shape.len() != 3 {
            return Err(ArchGradError::RankTooLow {
                shape: input_shape.to_vec(),
                operation: "pooling expects [height, width, channels]".to_string(),
            });
        }
        for &extent in &input_shape[..2] {
            if size == 0 || extent % size != 0 {
                return Err(ArchGradError::IndivisibleSplit {
                    length: extent,
                    count: size,
                    operation: "pooling".to_string(),
                });
            }
        }
        Ok(Pool {
            kind,
            size,
            input_shape: input_shape.to_vec(),
            output_shape: vec![input_shape[0] / size, input_shape[1] / size, input_shape[2]],
        })
    }
}

impl Layer for Pool {
    fn kind(&self) -> LayerKind {
        match self.kind {
            PoolKind::Max => LayerKind::MaxPool,
            PoolKind::Average => LayerKind::AvgPool,
        }
    }

    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, 1, "pool")?;
        check_batch_shape(&inputs[0], &self.input_shape, "pool")?;
        let mut current = inputs[0].clone();
        for axis in [1, 2] {
            current = match self.kind {
                PoolKind::Max => session.max_reduce(&current, axis, self.size)?,
                PoolKind::Average => session.mean_reduce(&current, axis, self.size)?,
            };
        }
        Ok(vec![current])
    }

    fn output_shape(&self) -> &[usize] {
        &self.output_shape
    }

    fn architecture(&self) -> String {
        let suffix = match self.kind {
            PoolKind::Max => "MP",
            PoolKind::Average => "AP",
        };
        format!("{}x{}{}", self.size, self.size, suffix)
    }
}
