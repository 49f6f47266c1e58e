//! # Activation Functions
//!
//! Pointwise non-linearities and the last-axis softmax.
//!
//! The pointwise functions share [`PointwiseBackward`]: each one supplies its
//! derivative as a function of the input and the output value.

pub mod relu;
pub mod sigmoid;
pub mod softmax;
pub mod tanh;

pub use relu::relu_op;
pub use sigmoid::sigmoid_op;
pub use softmax::softmax_op;
pub use tanh::tanh_op;

use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

/// Derivative `f'(x)` given `x` and `y = f(x)`.
pub(crate) type Derivative = fn(f32, f32) -> f32;

pub(crate) struct PointwiseBackward {
    input: Tensor,
    output: Tensor,
    derivative: Derivative,
}

impl std::fmt::Debug for PointwiseBackward {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointwiseBackward")
            .field("input", &self.input.node_id())
            .field("output", &self.output.node_id())
            .finish()
    }
}

impl BackwardOp for PointwiseBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grad_output = self.output.grad();
        let x = self.input.values_arc();
        let y = self.output.values_arc();
        let delta: Vec<f32> = grad_output
            .iter()
            .zip(x.iter().zip(y.iter()))
            .map(|(g, (&xi, &yi))| g * (self.derivative)(xi, yi))
            .collect();
        self.input.accumulate_grad(&delta)
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

/// Applies `function` elementwise and records its derivative.
pub(crate) fn pointwise_op(
    session: &mut Session,
    name: &'static str,
    x: &Tensor,
    function: fn(f32) -> f32,
    derivative: Derivative,
) -> Result<Tensor, ArchGradError> {
    session.ensure_recording(name)?;
    let values = x.values_arc().iter().map(|&v| function(v)).collect();
    let output = Tensor::new(values, x.shape())?;
    session.push(
        name,
        PointwiseBackward {
            input: x.clone(),
            output: output.clone(),
            derivative,
        },
    );
    Ok(output)
}

#[cfg(test)]
#[path = "activation_test.rs"]
mod tests;
