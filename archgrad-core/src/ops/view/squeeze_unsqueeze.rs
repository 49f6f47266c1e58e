use super::copy::IdentityBackward;
use super::utils::normalize_axis;
use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

fn aliased(x: &Tensor, shape: Vec<usize>) -> Result<Tensor, ArchGradError> {
    Ok(Tensor::from_data(TensorData::with_buffer(
        x.values_arc(),
        shape,
    )?))
}

/// Removes a size-1 axis. The output aliases the input's buffer.
///
/// # Errors
/// - `NegativeAxisIndex` / `AxisOutOfRange` for an invalid axis.
/// - `NotUnitAxis` if the axis does not have size 1.
/// - `RankTooLow` if the input is rank 1.
pub fn squeeze_op(session: &mut Session, x: &Tensor, axis: isize) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("squeeze")?;
    let mut shape = x.shape();
    let axis = normalize_axis(axis, shape.len(), "squeeze")?;
    if shape[axis] != 1 {
        return Err(ArchGradError::NotUnitAxis {
            axis,
            size: shape[axis],
            shape,
        });
    }
    if shape.len() < 2 {
        return Err(ArchGradError::RankTooLow {
            shape,
            operation: "squeeze".to_string(),
        });
    }
    shape.remove(axis);
    let output = aliased(x, shape)?;
    session.push(
        "squeeze",
        IdentityBackward {
            input: x.clone(),
            output: output.clone(),
        },
    );
    Ok(output)
}

/// Inserts a size-1 axis at `axis` (`0..=rank`). The output aliases the input's buffer.
pub fn expand_op(session: &mut Session, x: &Tensor, axis: isize) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("expand")?;
    let mut shape = x.shape();
    let axis = normalize_axis(axis, shape.len() + 1, "expand")?;
    shape.insert(axis, 1);
    let output = aliased(x, shape)?;
    session.push(
        "expand",
        IdentityBackward {
            input: x.clone(),
            output: output.clone(),
        },
    );
    Ok(output)
}

#[cfg(test)]
#[path = "squeeze_unsqueeze_test.rs"]
mod tests;
