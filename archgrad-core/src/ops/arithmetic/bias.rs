use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

#[derive(Debug)]
struct AddBiasBackward {
    input: Tensor,
    bias: Tensor,
    output: Tensor,
}

impl BackwardOp for AddBiasBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grad_output = self.output.grad();
        let width = self.bias.numel();
        let mut grad_bias = vec![0.0; width];
        for row in grad_output.chunks(width) {
            for (b, g) in grad_bias.iter_mut().zip(row) {
                *b += *g;
            }
        }
        self.input.accumulate_grad(&grad_output)?;
        self.bias.accumulate_grad(&grad_bias)
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id(), self.bias.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

/// Adds a rank-1 `bias` to every position of the last axis of `x`.
///
/// # Errors
/// `ShapeMismatch` unless `bias` has shape `[x.shape().last()]`.
pub fn add_bias_op(session: &mut Session, x: &Tensor, bias: &Tensor) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("add_bias")?;
    let shape = x.shape();
    let bias_shape = bias.shape();
    if bias_shape.len() != 1 || shape.last() != bias_shape.first() {
        return Err(ArchGradError::ShapeMismatch {
            expected: shape[shape.len() - 1..].to_vec(),
            actual: bias_shape,
            operation: "add_bias".to_string(),
        });
    }
    let offsets = bias.values_arc();
    let values = x
        .values_arc()
        .chunks(offsets.len())
        .flat_map(|row| row.iter().zip(offsets.iter()).map(|(v, b)| v + b))
        .collect();
    let output = Tensor::new(values, shape)?;
    session.push(
        "add_bias",
        AddBiasBackward {
            input: x.clone(),
            bias: bias.clone(),
            output: output.clone(),
        },
    );
    Ok(output)
}
