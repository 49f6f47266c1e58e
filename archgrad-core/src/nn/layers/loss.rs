use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::nn::layer::{check_arity, Layer, LayerKind};
use crate::ops::activation::softmax::softmax_rows;
use crate::tensor::Tensor;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LossKind {
    /// Softmax over the last axis followed by cross-entropy.
    SoftmaxCrossEntropy,
    /// Half the squared error.
    L2,
}

impl LossKind {
    pub fn token(self) -> &'static str {
        match self {
            LossKind::SoftmaxCrossEntropy => "SM",
            LossKind::L2 => "L2",
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Terminal node of a layer graph.
///
/// The forward output is the prediction (class probabilities for
/// [`LossKind::SoftmaxCrossEntropy`], the raw input for [`LossKind::L2`]).
/// Its backward entry passes the output gradient straight through to the input,
/// so [`seed_gradient`](Loss::seed_gradient) writes the gradient of the loss
/// with respect to the *input* of this node.
#[derive(Debug)]
pub struct Loss {
    kind: LossKind,
    shape: Vec<usize>,
}

impl Loss {
    pub fn new(kind: LossKind, shape: &[usize]) -> Self {
        Loss {
            kind,
            shape: shape.to_vec(),
        }
    }

    pub fn loss_kind(&self) -> LossKind {
        self.kind
    }

    /// Computes the batch-mean loss of `output` (this node's forward result)
    /// against `target` and accumulates its gradient into `output`.
    ///
    /// # Errors
    /// `ShapeMismatch` if `target` and `output` differ in shape.
    pub fn seed_gradient(&self, output: &Tensor, target: &Tensor) -> Result<f32, ArchGradError> {
        let shape = output.shape();
        if target.shape() != shape {
            return Err(ArchGradError::ShapeMismatch {
                expected: shape,
                actual: target.shape(),
                operation: "seed_gradient".to_string(),
            });
        }
        let batch = shape[0] as f32;
        let (predicted, expected) = (output.values(), target.values());
        let loss: f32 = match self.kind {
            LossKind::SoftmaxCrossEntropy => predicted
                .iter()
                .zip(&expected)
                .map(|(p, t)| -t * p.max(1e-12).ln())
                .sum(),
            LossKind::L2 => predicted
                .iter()
                .zip(&expected)
                .map(|(y, t)| 0.5 * (y - t) * (y - t))
                .sum(),
        };
        // Both losses share the gradient (prediction - target) / batch.
        let grad: Vec<f32> = predicted
            .iter()
            .zip(&expected)
            .map(|(y, t)| (y - t) / batch)
            .collect();
        output.accumulate_grad(&grad)?;
        Ok(loss / batch)
    }
}

impl Layer for Loss {
    fn kind(&self) -> LayerKind {
        LayerKind::Loss
    }

    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, 1, "loss")?;
        let x = &inputs[0];
        let shape = x.shape();
        let values = match self.kind {
            LossKind::SoftmaxCrossEntropy => softmax_rows(&x.values(), shape[shape.len() - 1]),
            LossKind::L2 => x.values(),
        };
        let output = Tensor::new(values, shape)?;
        session.record("loss", &[x.clone()], &[output.clone()], |inputs, outputs| {
            inputs[0].accumulate_grad(&outputs[0].grad())
        })?;
        Ok(vec![output])
    }

    fn output_shape(&self) -> &[usize] {
        &self.shape
    }

    fn architecture(&self) -> String {
        self.kind.token().to_string()
    }

    fn as_loss(&self) -> Option<&Loss> {
        Some(self)
    }
}

#[cfg(test)]
#[path = "loss_test.rs"]
mod tests;
