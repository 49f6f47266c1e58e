// Elementwise and broadcast-free arithmetic.
pub mod add;
pub mod bias;
pub mod mul;
pub mod scale;

pub use add::add_op;
pub use bias::add_bias_op;
pub use mul::mul_op;
pub use scale::scale_op;

use crate::error::ArchGradError;
use crate::tensor::Tensor;

/// Fails with `ShapeMismatch` unless `a` and `b` have identical shapes.
pub(crate) fn check_same_shape(a: &Tensor, b: &Tensor, operation: &str) -> Result<(), ArchGradError> {
    let (sa, sb) = (a.shape(), b.shape());
    if sa != sb {
        return Err(ArchGradError::ShapeMismatch {
            expected: sa,
            actual: sb,
            operation: operation.to_string(),
        });
    }
    Ok(())
}
