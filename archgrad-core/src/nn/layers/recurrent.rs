use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::nn::init::xavier_uniform;
use crate::nn::layer::{check_arity, check_batch_shape, Layer, LayerKind};
use crate::nn::Parameter;
use crate::tensor::{self, Tensor};
use rand::Rng;

/// Elman recurrent layer `h_t = tanh(x_t . W_x + h_{t-1} . W_h + b)`, unrolled
/// over the leading per-sample axis (time).
///
/// Every axis after time is flattened into the feature vector. The full-sequence
/// variant emits `[time, units]`; the summarizing variant emits only the final
/// state `[units]`.
#[derive(Debug)]
pub struct Recurrent {
    input_shape: Vec<usize>,
    output_shape: Vec<usize>,
    summarize: bool,
    input_weight: Parameter,
    state_weight: Parameter,
    bias: Parameter,
}

impl Recurrent {
    /// # Errors
    /// `RankTooLow` for a rank-1 input (no time axis).
    pub fn new<R: Rng + ?Sized>(
        input_shape: &[usize],
        units: usize,
        summarize: bool,
        rng: &mut R,
    ) -> Result<Self, ArchGradError> {
        if input_shape.len() < 2 {
            return Err(ArchGradError::RankTooLow {
                shape: input_shape.to_vec(),
                operation: "recurrent expects [time, features...]".to_string(),
            });
        }
        let steps = input_shape[0];
        let features: usize = input_shape[1..].iter().product();
        let output_shape = if summarize { vec![units] } else { vec![steps, units] };
        Ok(Recurrent {
            input_shape: input_shape.to_vec(),
            output_shape,
            summarize,
            input_weight: Parameter::new(
                xavier_uniform(&[features, units], features, units, rng)?,
                "rnn.input_weight",
            ),
            state_weight: Parameter::new(
                xavier_uniform(&[units, units], units, units, rng)?,
                "rnn.state_weight",
            ),
            bias: Parameter::new(tensor::zeros(&[units])?, "rnn.bias"),
        })
    }

    fn units(&self) -> usize {
        self.bias.numel()
    }
}

impl Layer for Recurrent {
    fn kind(&self) -> LayerKind {
        LayerKind::Recurrent
    }

    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, 1, "recurrent")?;
        let batch = check_batch_shape(&inputs[0], &self.input_shape, "recurrent")?;
        let steps = self.input_shape[0];
        let sequence = if self.input_shape.len() == 2 {
            inputs[0].clone()
        } else {
            let features = self.input_weight.shape()[0];
            session.reshape(&inputs[0], vec![batch, steps, features])?
        };

        let frames = session.unstack(&sequence, 1)?;
        let mut state = tensor::zeros(&[batch, self.units()])?;
        let mut states = Vec::with_capacity(steps);
        for frame in &frames {
            let from_input = session.matmul(frame, &self.input_weight)?;
            let from_state = session.matmul(&state, &self.state_weight)?;
            let summed = session.add(&from_input, &from_state)?;
            let biased = session.add_bias(&summed, &self.bias)?;
            state = session.tanh(&biased)?;
            states.push(state.clone());
        }
        if self.summarize {
            Ok(vec![state])
        } else {
            Ok(vec![session.stack(&states, 1)?])
        }
    }

    fn output_shape(&self) -> &[usize] {
        &self.output_shape
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.input_weight, &self.state_weight, &self.bias]
    }

    fn init_bias(&self, value: f32) {
        self.bias.fill(value);
    }

    fn architecture(&self) -> String {
        format!("{}R{}", self.units(), if self.summarize { "S" } else { "" })
    }
}

#[cfg(test)]
#[path = "recurrent_test.rs"]
mod tests;
