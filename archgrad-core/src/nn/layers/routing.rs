use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::nn::layer::{check_arity, Layer, LayerKind};
use crate::tensor::Tensor;

/// Fan-out node: hands every outgoing edge its own copy of the input, so the
/// backward pass sums the branch gradients into the input.
#[derive(Debug)]
pub struct Split {
    branches: usize,
    shape: Vec<usize>,
}

impl Split {
    pub fn new(branches: usize, shape: &[usize]) -> Self {
        Split {
            branches,
            shape: shape.to_vec(),
        }
    }
}

impl Layer for Split {
    fn kind(&self) -> LayerKind {
        LayerKind::Split
    }

    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, 1, "split")?;
        (0..self.branches)
            .map(|_| session.copy(&inputs[0]))
            .collect()
    }

    fn output_shape(&self) -> &[usize] {
        &self.shape
    }

    fn output_count(&self) -> usize {
        self.branches
    }

    fn architecture(&self) -> String {
        "SPLIT".to_string()
    }
}

/// Fan-in node: concatenates its inputs along the last axis.
#[derive(Debug)]
pub struct Concat {
    inputs: usize,
    shape: Vec<usize>,
}

impl Concat {
    /// # Errors
    /// `EmptyTensorList` without inputs, `ShapeMismatch` if the inputs differ
    /// in rank or in any axis but the last.
    pub fn new(input_shapes: &[Vec<usize>]) -> Result<Self, ArchGradError> {
        let first = input_shapes.first().ok_or_else(|| ArchGradError::EmptyTensorList {
            operation: "concat layer".to_string(),
        })?;
        let rank = first.len();
        if rank == 0 {
            return Err(ArchGradError::InvalidShape { shape: first.clone() });
        }
        let mut shape = first.clone();
        for other in &input_shapes[1..] {
            if other.len() != rank || other[..rank - 1] != first[..rank - 1] {
                return Err(ArchGradError::ShapeMismatch {
                    expected: first.clone(),
                    actual: other.clone(),
                    operation: "concat layer".to_string(),
                });
            }
            shape[rank - 1] += other[rank - 1];
        }
        Ok(Concat {
            inputs: input_shapes.len(),
            shape,
        })
    }
}

impl Layer for Concat {
    fn kind(&self) -> LayerKind {
        LayerKind::Concat
    }

    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, self.inputs, "concat")?;
        Ok(vec![session.concat(inputs, self.shape.len() as isize)?])
    }

    fn output_shape(&self) -> &[usize] {
        &self.shape
    }

    fn architecture(&self) -> String {
        "CONCAT".to_string()
    }
}
