use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::nn::layer::{check_arity, check_batch_shape, Layer, LayerKind};
use crate::tensor::Tensor;
use crate::tensor_data::validate_shape;

/// Entry point of a layer graph: checks and forwards the caller's batch.
#[derive(Debug)]
pub struct Input {
    shape: Vec<usize>,
}

impl Input {
    pub fn new(shape: Vec<usize>) -> Result<Self, ArchGradError> {
        validate_shape(&shape)?;
        Ok(Input { shape })
    }
}

impl Layer for Input {
    fn kind(&self) -> LayerKind {
        LayerKind::Input
    }

    fn forward(&self, _session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, 1, "input")?;
        check_batch_shape(&inputs[0], &self.shape, "input")?;
        Ok(vec![inputs[0].clone()])
    }

    fn output_shape(&self) -> &[usize] {
        &self.shape
    }

    fn architecture(&self) -> String {
        self.shape
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join("x")
    }
}
