use archgrad_core::nn::{ActivationKind, LossKind};

/// Knobs of [`compile_with`](crate::compile_with).
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    /// Insert the default activation after every node that asks for one.
    pub add_activation_layers: bool,
    /// Terminate every sink without a loss node with the default loss.
    pub add_loss_layer: bool,
    /// Per-sample shape fed to the source node. `-1` entries of an explicit
    /// input declaration are taken from here.
    pub input_shape: Vec<usize>,
    pub default_activation: ActivationKind,
    pub default_loss: LossKind,
    /// Bias given to trainable nodes that feed a rectifier directly.
    pub relu_bias: f32,
    /// Seed for parameter initialization; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            add_activation_layers: true,
            add_loss_layer: true,
            input_shape: vec![28, 28, 1],
            default_activation: ActivationKind::Relu,
            default_loss: LossKind::SoftmaxCrossEntropy,
            relu_bias: 0.1,
            seed: None,
        }
    }
}

impl CompileOptions {
    pub fn with_activation_layers(mut self, enabled: bool) -> Self {
        self.add_activation_layers = enabled;
        self
    }

    pub fn with_loss_layer(mut self, enabled: bool) -> Self {
        self.add_loss_layer = enabled;
        self
    }

    pub fn with_input_shape(mut self, shape: impl Into<Vec<usize>>) -> Self {
        self.input_shape = shape.into();
        self
    }

    pub fn with_default_activation(mut self, kind: ActivationKind) -> Self {
        self.default_activation = kind;
        self
    }

    pub fn with_default_loss(mut self, kind: LossKind) -> Self {
        self.default_loss = kind;
        self
    }

    pub fn with_relu_bias(mut self, bias: f32) -> Self {
        self.relu_bias = bias;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
