// archgrad-core/src/ops/view/mod.rs

pub mod copy;
pub mod reshape;
pub mod slice;
pub mod squeeze_unsqueeze;

pub(crate) mod utils;

pub use copy::copy_op;
pub use reshape::reshape_op;
pub use slice::slice_op;
pub use squeeze_unsqueeze::{expand_op, squeeze_op};
