use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::nn::init::xavier_uniform;
use crate::nn::layer::{check_arity, check_batch_shape, Layer, LayerKind};
use crate::nn::Parameter;
use crate::tensor::{self, Tensor};
use rand::Rng;

/// Fully-connected layer: flattens each sample and applies `x . W + b`.
#[derive(Debug)]
pub struct FullyConnected {
    input_shape: Vec<usize>,
    output_shape: Vec<usize>,
    weight: Parameter,
    bias: Parameter,
}

impl FullyConnected {
    /// Creates a layer with `units` outputs for samples of `input_shape`.
    pub fn new<R: Rng + ?Sized>(
        input_shape: &[usize],
        units: usize,
        rng: &mut R,
    ) -> Result<Self, ArchGradError> {
        let fan_in: usize = input_shape.iter().product();
        let weight = xavier_uniform(&[fan_in, units], fan_in, units, rng)?;
        let bias = tensor::zeros(&[units])?;
        Ok(FullyConnected {
            input_shape: input_shape.to_vec(),
            output_shape: vec![units],
            weight: Parameter::new(weight, "fc.weight"),
            bias: Parameter::new(bias, "fc.bias"),
        })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> &Parameter {
        &self.bias
    }
}

impl Layer for FullyConnected {
    fn kind(&self) -> LayerKind {
        LayerKind::FullyConnected
    }

    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, 1, "fully_connected")?;
        let batch = check_batch_shape(&inputs[0], &self.input_shape, "fully_connected")?;
        let flat = if self.input_shape.len() == 1 {
            inputs[0].clone()
        } else {
            session.reshape(&inputs[0], vec![batch, self.weight.shape()[0]])?
        };
        let product = session.matmul(&flat, &self.weight)?;
        Ok(vec![session.add_bias(&product, &self.bias)?])
    }

    fn output_shape(&self) -> &[usize] {
        &self.output_shape
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.weight, &self.bias]
    }

    fn needs_activation(&self) -> bool {
        true
    }

    fn init_bias(&self, value: f32) {
        self.bias.fill(value);
    }

    fn architecture(&self) -> String {
        format!("{}N", self.output_shape[0])
    }
}

#[cfg(test)]
#[path = "dense_test.rs"]
mod tests;
