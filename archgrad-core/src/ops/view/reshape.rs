use super::copy::IdentityBackward;
use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::tensor::Tensor;
use crate::tensor_data::{validate_shape, TensorData};

/// Reinterprets `x` with a new shape of the same element count.
///
/// The output aliases the input's value buffer; no values are copied. The
/// gradient flows back unchanged, reinterpreted in the input's shape.
///
/// # Errors
/// `InvalidShape` for an empty or zero-sized target shape, `ShapeMismatch` if the
/// element counts differ.
pub fn reshape_op(
    session: &mut Session,
    x: &Tensor,
    shape: Vec<usize>,
) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("reshape")?;
    validate_shape(&shape)?;
    let input_shape = x.shape();
    if shape.iter().product::<usize>() != input_shape.iter().product::<usize>() {
        return Err(ArchGradError::ShapeMismatch {
            expected: input_shape,
            actual: shape,
            operation: "reshape".to_string(),
        });
    }
    let output = Tensor::from_data(TensorData::with_buffer(x.values_arc(), shape)?);
    session.push(
        "reshape",
        IdentityBackward {
            input: x.clone(),
            output: output.clone(),
        },
    );
    Ok(output)
}

#[cfg(test)]
#[path = "reshape_test.rs"]
mod tests;
