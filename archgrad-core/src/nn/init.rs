//! Parameter initializers.

use crate::error::ArchGradError;
use crate::tensor::{self, Tensor};
use rand::Rng;

/// Glorot/Xavier uniform: samples in `±sqrt(6 / (fan_in + fan_out))`.
pub fn xavier_uniform<R: Rng + ?Sized>(
    shape: &[usize],
    fan_in: usize,
    fan_out: usize,
    rng: &mut R,
) -> Result<Tensor, ArchGradError> {
    let limit = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
    tensor::uniform(shape, -limit, limit, rng)
}

/// He/Kaiming normal: `Normal(0, sqrt(2 / fan_in))`, used for rectified layers.
pub fn kaiming_normal<R: Rng + ?Sized>(
    shape: &[usize],
    fan_in: usize,
    rng: &mut R,
) -> Result<Tensor, ArchGradError> {
    tensor::randn(shape, (2.0 / fan_in.max(1) as f32).sqrt(), rng)
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
