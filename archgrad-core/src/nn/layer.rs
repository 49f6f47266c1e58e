use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::nn::layers::{ActivationKind, Loss};
use crate::nn::Parameter;
use crate::tensor::Tensor;

/// The closed set of layer kinds a layer graph can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Input,
    FullyConnected,
    Convolution,
    MaxPool,
    AvgPool,
    Recurrent,
    Dropout,
    Scale,
    Lrn,
    Split,
    Concat,
    Activation,
    Loss,
}

/// A computational node of a layer graph.
///
/// Shapes reported by a layer are per sample: every tensor passed to
/// [`forward`](Layer::forward) carries one extra leading batch axis.
pub trait Layer: std::fmt::Debug + Send + Sync {
    fn kind(&self) -> LayerKind;

    /// Runs the layer on one tensor per incoming edge and returns one tensor
    /// per outgoing edge, registering backward entries with `session`.
    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError>;

    /// Per-sample shape of every output tensor.
    fn output_shape(&self) -> &[usize];

    /// Number of tensors `forward` returns. Only fan-out nodes return more than one.
    fn output_count(&self) -> usize {
        1
    }

    /// The learnable parameters of the layer.
    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }

    /// True for trainable nodes whose output should pass through a
    /// non-linearity before the next trainable node.
    fn needs_activation(&self) -> bool {
        false
    }

    /// Overwrites the bias parameter, if the layer has one, with `value`.
    fn init_bias(&self, _value: f32) {}

    /// The grammar token that rebuilds this layer.
    fn architecture(&self) -> String;

    /// Downcast used to seed the loss gradient.
    fn as_loss(&self) -> Option<&Loss> {
        None
    }

    /// The non-linearity applied by an activation node.
    fn activation_kind(&self) -> Option<ActivationKind> {
        None
    }

    fn is_trainable(&self) -> bool {
        !self.parameters().is_empty()
    }
}

/// Fails with `ShapeMismatch` unless `input` is `[batch, expected...]`.
pub(crate) fn check_batch_shape(
    input: &Tensor,
    expected: &[usize],
    operation: &str,
) -> Result<usize, ArchGradError> {
    let shape = input.shape();
    if shape.len() != expected.len() + 1 || shape[1..] != *expected {
        let mut batched = vec![shape.first().copied().unwrap_or(1)];
        batched.extend_from_slice(expected);
        return Err(ArchGradError::ShapeMismatch {
            expected: batched,
            actual: shape,
            operation: operation.to_string(),
        });
    }
    Ok(shape[0])
}

/// Fails with `InternalError` unless exactly `expected` inputs were supplied.
pub(crate) fn check_arity(inputs: &[Tensor], expected: usize, layer: &str) -> Result<(), ArchGradError> {
    if inputs.len() != expected {
        return Err(ArchGradError::InternalError(format!(
            "{} expects {} input tensor(s), got {}",
            layer,
            expected,
            inputs.len()
        )));
    }
    Ok(())
}
