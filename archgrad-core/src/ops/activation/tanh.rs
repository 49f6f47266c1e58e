use super::pointwise_op;
use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::tensor::Tensor;

/// Hyperbolic tangent elementwise.
pub fn tanh_op(session: &mut Session, x: &Tensor) -> Result<Tensor, ArchGradError> {
    pointwise_op(session, "tanh", x, f32::tanh, |_, y| 1.0 - y * y)
}
