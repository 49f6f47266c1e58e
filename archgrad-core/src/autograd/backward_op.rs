use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};
use std::fmt::{self, Debug};

/// The backward half of a differentiable operation.
///
/// Every operation in the library builds one of these during its forward call
/// and hands it to the [`Session`](super::Session), which replays them in reverse
/// registration order when it is finalized.
///
/// An implementation holds handles to the tensors it produced and consumed. When
/// `backward` runs, the gradients of its outputs are complete (every later
/// consumer has already been replayed) and it must **add** its contribution into
/// the gradient buffers of its inputs, never assign: a tensor feeding several
/// operations receives the sum over all of them.
///
/// The trait requires `Debug + Send + Sync` so trace entries can be inspected and
/// sessions can be moved to another thread between passes.
pub trait BackwardOp: Debug + Send + Sync {
    /// Accumulates input gradients from the current output gradients.
    fn backward(&self) -> Result<(), ArchGradError>;

    /// Identities of the input tensors, in forward argument order.
    fn inputs(&self) -> Vec<NodeId>;

    /// Identities of the output tensors, in forward result order.
    fn outputs(&self) -> Vec<NodeId>;
}

pub(crate) type BackwardFn =
    dyn Fn(&[Tensor], &[Tensor]) -> Result<(), ArchGradError> + Send + Sync;

/// Adapts a caller-supplied closure to [`BackwardOp`].
/// Created by [`Session::record`](super::Session::record) for custom layers.
pub(crate) struct ClosureBackward {
    pub(crate) inputs: Vec<Tensor>,
    pub(crate) outputs: Vec<Tensor>,
    pub(crate) backward: Box<BackwardFn>,
}

impl Debug for ClosureBackward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureBackward")
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .finish()
    }
}

impl BackwardOp for ClosureBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        (self.backward)(&self.inputs, &self.outputs)
    }

    fn inputs(&self) -> Vec<NodeId> {
        self.inputs.iter().map(Tensor::node_id).collect()
    }

    fn outputs(&self) -> Vec<NodeId> {
        self.outputs.iter().map(Tensor::node_id).collect()
    }
}
