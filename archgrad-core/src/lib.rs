//! Tensors, the differentiation session, the operation library and the layer
//! kinds of an architecture-compiled network.
//!
//! Operations run eagerly under a [`Session`], which records one backward entry
//! per call and replays them in reverse when finalized.

pub mod autograd;
pub mod error;
pub mod nn;
pub mod ops;
pub mod optim;
pub mod tensor;
pub mod tensor_data;

pub use autograd::Session;
pub use error::ArchGradError;
pub use ops::SplitArg;
pub use tensor::Tensor;
