use crate::error::ArchGradError;
use crate::tensor::Tensor;
use crate::tensor_data::validate_shape;

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

/// Creates a zero-filled tensor.
///
/// # Errors
/// `InvalidShape` if the shape is empty or any axis is zero.
pub fn zeros(shape: &[usize]) -> Result<Tensor, ArchGradError> {
    full(shape, 0.0)
}

/// Creates a zero-filled tensor with the same shape as `tensor`.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, ArchGradError> {
    zeros(&tensor.shape())
}

/// Creates a tensor filled with `value`.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, ArchGradError> {
    validate_shape(shape)?;
    let numel = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Normal(0, std) samples drawn from `rng`.
pub fn randn<R: Rng + ?Sized>(
    shape: &[usize],
    std: f32,
    rng: &mut R,
) -> Result<Tensor, ArchGradError> {
    validate_shape(shape)?;
    let normal = Normal::new(0.0f32, std).map_err(|e| {
        ArchGradError::UnsupportedOperation(format!("randn with std {}: {}", std, e))
    })?;
    let numel = shape.iter().product();
    let values: Vec<f32> = (0..numel).map(|_| normal.sample(rng)).collect();
    Tensor::new(values, shape.to_vec())
}

/// Uniform samples in `[low, high)` drawn from `rng`.
pub fn uniform<R: Rng + ?Sized>(
    shape: &[usize],
    low: f32,
    high: f32,
    rng: &mut R,
) -> Result<Tensor, ArchGradError> {
    validate_shape(shape)?;
    if !(low < high) {
        return Err(ArchGradError::UnsupportedOperation(format!(
            "uniform requires low < high, got [{}, {})",
            low, high
        )));
    }
    let dist = Uniform::new(low, high);
    let numel = shape.iter().product();
    let values: Vec<f32> = (0..numel).map(|_| dist.sample(rng)).collect();
    Tensor::new(values, shape.to_vec())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
