use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::tensor::Tensor;
use approx::relative_eq;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input tensor at index {input_index}, element index {element_index}: Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(ArchGradError),
    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(ArchGradError),
    #[error("Output gradient has {actual} elements but the output has {expected}")]
    OutputGradLength { expected: usize, actual: usize },
    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index}")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
    },
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(ArchGradError),
}

impl From<ArchGradError> for GradCheckError {
    fn from(err: ArchGradError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Checks analytical gradients against central finite differences.
///
/// `func` builds its output under the session it is handed. The scalar being
/// differentiated is `sum(output * output_grad)`, so the analytical side seeds
/// `output_grad` on the output and finalizes the session. Every input is
/// perturbed elementwise by `±epsilon` and the forward is re-run on a throwaway
/// session.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &[f32],
    epsilon: f32,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&mut Session, &[Tensor]) -> Result<Tensor, ArchGradError>,
{
    // --- 1. Analytical gradients ---
    for input in inputs {
        input.zero_grad();
    }
    let mut session = Session::new();
    let output = func(&mut session, inputs).map_err(GradCheckError::ForwardPassError)?;
    if output.numel() != output_grad.len() {
        return Err(GradCheckError::OutputGradLength {
            expected: output.numel(),
            actual: output_grad.len(),
        });
    }
    output.accumulate_grad(output_grad)?;
    session
        .finalize()
        .map_err(GradCheckError::BackwardPassError)?;
    let analytical: Vec<Vec<f32>> = inputs.iter().map(Tensor::grad).collect();

    // --- 2. Numerical gradients ---
    for (i, original) in inputs.iter().enumerate() {
        let base = original.values();
        for elem_idx in 0..base.len() {
            let loss_at = |delta: f32| -> Result<f64, GradCheckError> {
                let mut perturbed = base.clone();
                perturbed[elem_idx] += delta;
                let mut shifted: Vec<Tensor> = inputs.to_vec();
                shifted[i] = Tensor::new(perturbed, original.shape())?;
                let mut scratch = Session::new();
                let out = func(&mut scratch, &shifted).map_err(GradCheckError::ForwardPassError)?;
                Ok(weighted_sum(&out.values(), output_grad))
            };
            let loss_plus = loss_at(epsilon)?;
            let loss_minus = loss_at(-epsilon)?;
            let numerical = (loss_plus - loss_minus) / (2.0 * epsilon as f64);
            if !numerical.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index: i,
                    element_index: elem_idx,
                });
            }

            let analytical_grad = analytical[i][elem_idx] as f64;
            if !relative_eq!(analytical_grad, numerical, epsilon = tolerance, max_relative = tolerance) {
                return Err(GradCheckError::GradientMismatch {
                    input_index: i,
                    element_index: elem_idx,
                    analytical_grad,
                    numerical_grad: numerical,
                    difference: (analytical_grad - numerical).abs(),
                });
            }
        }
    }
    Ok(())
}

fn weighted_sum(values: &[f32], weights: &[f32]) -> f64 {
    values
        .iter()
        .zip(weights)
        .map(|(&v, &w)| v as f64 * w as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_gradient_passes() -> Result<(), GradCheckError> {
        let x = Tensor::new(vec![0.5, -1.0, 2.0], vec![3])?;
        check_grad(|s, inputs| s.scale(&inputs[0], 3.0), &[x], &[1.0, -2.0, 0.5], 1e-2, 1e-3)
    }

    #[test]
    fn test_wrong_backward_is_reported() -> Result<(), ArchGradError> {
        let x = Tensor::new(vec![0.5, -1.0], vec![2])?;
        // Forward doubles the input but the backward passes the gradient through unscaled.
        let doubled = |s: &mut Session, inputs: &[Tensor]| -> Result<Tensor, ArchGradError> {
            let output = Tensor::new(inputs[0].values().iter().map(|v| v * 2.0).collect(), inputs[0].shape())?;
            s.record("doubled", &inputs[..1], &[output.clone()], |inputs, outputs| {
                inputs[0].accumulate_grad(&outputs[0].grad())
            })?;
            Ok(output)
        };
        assert!(matches!(
            check_grad(doubled, &[x], &[1.0, 1.0], 1e-2, 1e-3),
            Err(GradCheckError::GradientMismatch { element_index: 0, .. })
        ));
        Ok(())
    }
}
