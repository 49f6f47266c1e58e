use super::pointwise_op;
use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::tensor::Tensor;

/// `max(0, x)` elementwise. The derivative at 0 is taken as 0.
pub fn relu_op(session: &mut Session, x: &Tensor) -> Result<Tensor, ArchGradError> {
    pointwise_op(
        session,
        "relu",
        x,
        |v| v.max(0.0),
        |x, _| if x > 0.0 { 1.0 } else { 0.0 },
    )
}
