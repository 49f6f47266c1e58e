use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::nn::layer::{check_arity, Layer, LayerKind};
use crate::nn::layers::format_number;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use std::sync::Mutex;

/// Inverted dropout. Active only in a training session; otherwise the input
/// passes through untouched.
#[derive(Debug)]
pub struct Dropout {
    keep: f32,
    shape: Vec<usize>,
    rng: Mutex<StdRng>,
}

impl Dropout {
    /// # Errors
    /// `UnsupportedOperation` unless `0 < keep <= 1`.
    pub fn new(keep: f32, shape: &[usize], rng: StdRng) -> Result<Self, ArchGradError> {
        if !(keep > 0.0 && keep <= 1.0) {
            return Err(ArchGradError::UnsupportedOperation(format!(
                "dropout keep probability must be in (0, 1], got {}",
                keep
            )));
        }
        Ok(Dropout {
            keep,
            shape: shape.to_vec(),
            rng: Mutex::new(rng),
        })
    }
}

impl Layer for Dropout {
    fn kind(&self) -> LayerKind {
        LayerKind::Dropout
    }

    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, 1, "dropout")?;
        if !session.is_training() {
            return Ok(vec![inputs[0].clone()]);
        }
        let mut rng = self.rng.lock().expect("Mutex poisoned");
        Ok(vec![session.dropout(&inputs[0], self.keep, &mut *rng)?])
    }

    fn output_shape(&self) -> &[usize] {
        &self.shape
    }

    fn architecture(&self) -> String {
        format!("D{}", format_number(self.keep))
    }
}
