use super::pointwise_op;
use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::tensor::Tensor;

/// Numerically stable logistic function.
pub(crate) fn sigmoid(v: f32) -> f32 {
    if v >= 0.0 {
        1.0 / (1.0 + (-v).exp())
    } else {
        let e = v.exp();
        e / (1.0 + e)
    }
}

/// `1 / (1 + exp(-x))` elementwise.
pub fn sigmoid_op(session: &mut Session, x: &Tensor) -> Result<Tensor, ArchGradError> {
    pointwise_op(session, "sigmoid", x, sigmoid, |_, y| y * (1.0 - y))
}
