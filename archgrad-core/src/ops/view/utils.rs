use crate::error::ArchGradError;

/// Validates an axis argument against `bound` and converts it to `usize`.
///
/// `bound` is the rank for ops that address an existing axis, and the rank + 1
/// for ops that insert one (stack, expand).
///
/// # Errors
/// `NegativeAxisIndex` for a negative axis, `AxisOutOfRange` if `axis >= bound`.
pub(crate) fn normalize_axis(
    axis: isize,
    bound: usize,
    operation: &str,
) -> Result<usize, ArchGradError> {
    if axis < 0 {
        return Err(ArchGradError::NegativeAxisIndex {
            axis,
            operation: operation.to_string(),
        });
    }
    let axis = axis as usize;
    if axis >= bound {
        return Err(ArchGradError::AxisOutOfRange {
            axis,
            rank: bound,
            operation: operation.to_string(),
        });
    }
    Ok(axis)
}

/// Fails with `EmptyTensorList` if `tensors` is empty, otherwise returns the
/// shape of the first tensor.
pub(crate) fn first_shape(
    tensors: &[crate::tensor::Tensor],
    operation: &str,
) -> Result<Vec<usize>, ArchGradError> {
    tensors
        .first()
        .map(|t| t.shape())
        .ok_or_else(|| ArchGradError::EmptyTensorList {
            operation: operation.to_string(),
        })
}
