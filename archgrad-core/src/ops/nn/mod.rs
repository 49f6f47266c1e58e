//! Windowed and normalizing operations used by the convolutional layers.

pub mod conv2d;
pub mod dropout;
pub mod lrn;

pub use conv2d::{conv2d_op, Conv2dConfig};
pub use dropout::dropout_op;
pub use lrn::{lrn_op, LrnConfig};
