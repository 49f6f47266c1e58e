//! The operation library.
//!
//! Every operation validates its arguments, computes its output eagerly, and
//! registers one backward entry with the [`Session`]. Backward entries only ever
//! add into input gradients. The free functions (`concat_op`, `split_op`, ...)
//! are also reachable as methods on `Session`.

pub mod activation;
pub mod arithmetic;
pub mod concat;
pub mod linalg;
pub mod nn;
pub mod reduction;
pub mod stack;
pub mod tile;
pub mod view;

pub use concat::{concat_op, split_op, SplitArg};
pub use stack::{stack_op, unstack_op};
pub use tile::{tile_op, untile_op};

use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::tensor::Tensor;
use rand::Rng;

impl Session {
    /// See [`view::copy_op`].
    pub fn copy(&mut self, x: &Tensor) -> Result<Tensor, ArchGradError> {
        view::copy_op(self, x)
    }

    /// See [`concat_op`].
    pub fn concat(&mut self, xs: &[Tensor], axis: isize) -> Result<Tensor, ArchGradError> {
        concat_op(self, xs, axis)
    }

    /// See [`split_op`].
    pub fn split(&mut self, x: &Tensor, axis: isize, split: SplitArg) -> Result<Vec<Tensor>, ArchGradError> {
        split_op(self, x, axis, split)
    }

    pub fn stack(&mut self, xs: &[Tensor], axis: isize) -> Result<Tensor, ArchGradError> {
        stack_op(self, xs, axis)
    }

    pub fn unstack(&mut self, x: &Tensor, axis: isize) -> Result<Vec<Tensor>, ArchGradError> {
        unstack_op(self, x, axis)
    }

    pub fn tile(&mut self, x: &Tensor, axis: isize, count: usize) -> Result<Tensor, ArchGradError> {
        tile_op(self, x, axis, count)
    }

    pub fn untile(&mut self, x: &Tensor, axis: isize, count: usize) -> Result<Tensor, ArchGradError> {
        untile_op(self, x, axis, count)
    }

    /// See [`reduction::max_reduce_op`].
    pub fn max_reduce(&mut self, x: &Tensor, axis: isize, count: usize) -> Result<Tensor, ArchGradError> {
        reduction::max_reduce_op(self, x, axis, count)
    }

    pub fn mean_reduce(&mut self, x: &Tensor, axis: isize, count: usize) -> Result<Tensor, ArchGradError> {
        reduction::mean_reduce_op(self, x, axis, count)
    }

    pub fn squeeze(&mut self, x: &Tensor, axis: isize) -> Result<Tensor, ArchGradError> {
        view::squeeze_op(self, x, axis)
    }

    pub fn expand(&mut self, x: &Tensor, axis: isize) -> Result<Tensor, ArchGradError> {
        view::expand_op(self, x, axis)
    }

    /// See [`view::reshape_op`].
    pub fn reshape(&mut self, x: &Tensor, shape: Vec<usize>) -> Result<Tensor, ArchGradError> {
        view::reshape_op(self, x, shape)
    }

    /// See [`view::slice_op`].
    pub fn slice(&mut self, x: &Tensor, offsets: &[usize], sizes: &[usize]) -> Result<Tensor, ArchGradError> {
        view::slice_op(self, x, offsets, sizes)
    }

    pub fn add(&mut self, a: &Tensor, b: &Tensor) -> Result<Tensor, ArchGradError> {
        arithmetic::add_op(self, a, b)
    }

    pub fn add_bias(&mut self, x: &Tensor, bias: &Tensor) -> Result<Tensor, ArchGradError> {
        arithmetic::add_bias_op(self, x, bias)
    }

    pub fn mul(&mut self, a: &Tensor, b: &Tensor) -> Result<Tensor, ArchGradError> {
        arithmetic::mul_op(self, a, b)
    }

    pub fn scale(&mut self, x: &Tensor, factor: f32) -> Result<Tensor, ArchGradError> {
        arithmetic::scale_op(self, x, factor)
    }

    pub fn matmul(&mut self, a: &Tensor, b: &Tensor) -> Result<Tensor, ArchGradError> {
        linalg::matmul_op(self, a, b)
    }

    pub fn relu(&mut self, x: &Tensor) -> Result<Tensor, ArchGradError> {
        activation::relu_op(self, x)
    }

    pub fn sigmoid(&mut self, x: &Tensor) -> Result<Tensor, ArchGradError> {
        activation::sigmoid_op(self, x)
    }

    pub fn tanh(&mut self, x: &Tensor) -> Result<Tensor, ArchGradError> {
        activation::tanh_op(self, x)
    }

    pub fn softmax(&mut self, x: &Tensor) -> Result<Tensor, ArchGradError> {
        activation::softmax_op(self, x)
    }

    /// See [`nn::conv2d_op`].
    pub fn conv2d(
        &mut self,
        x: &Tensor,
        kernel: &Tensor,
        bias: &Tensor,
        config: nn::Conv2dConfig,
    ) -> Result<Tensor, ArchGradError> {
        nn::conv2d_op(self, x, kernel, bias, config)
    }

    pub fn lrn(&mut self, x: &Tensor, config: nn::LrnConfig) -> Result<Tensor, ArchGradError> {
        nn::lrn_op(self, x, config)
    }

    pub fn dropout<R: Rng + ?Sized>(&mut self, x: &Tensor, keep: f32, rng: &mut R) -> Result<Tensor, ArchGradError> {
        nn::dropout_op(self, x, keep, rng)
    }
}
