use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::nn::layer::{check_arity, Layer, LayerKind};
use crate::tensor::Tensor;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationKind {
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl ActivationKind {
    /// Grammar token of the activation.
    pub fn token(self) -> &'static str {
        match self {
            ActivationKind::Relu => "RELU",
            ActivationKind::Sigmoid => "SIGMOID",
            ActivationKind::Tanh => "TANH",
            ActivationKind::Softmax => "SOFTMAX",
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A parameter-free non-linearity.
#[derive(Debug)]
pub struct Activation {
    kind: ActivationKind,
    shape: Vec<usize>,
}

impl Activation {
    pub fn new(kind: ActivationKind, shape: &[usize]) -> Self {
        Activation {
            kind,
            shape: shape.to_vec(),
        }
    }

    pub fn activation(&self) -> ActivationKind {
        self.kind
    }
}

impl Layer for Activation {
    fn kind(&self) -> LayerKind {
        LayerKind::Activation
    }

    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, 1, "activation")?;
        let x = &inputs[0];
        let y = match self.kind {
            ActivationKind::Relu => session.relu(x)?,
            ActivationKind::Sigmoid => session.sigmoid(x)?,
            ActivationKind::Tanh => session.tanh(x)?,
            ActivationKind::Softmax => session.softmax(x)?,
        };
        Ok(vec![y])
    }

    fn output_shape(&self) -> &[usize] {
        &self.shape
    }

    fn architecture(&self) -> String {
        self.kind.token().to_string()
    }

    fn activation_kind(&self) -> Option<ActivationKind> {
        Some(self.kind)
    }
}
