use crate::error::ArchGradError;
use crate::nn::Parameter;
use crate::optim::optimizer_trait::Optimizer;

/// Stochastic gradient descent with classical momentum:
/// `v = momentum * v + g; p -= learning_rate * v`.
#[derive(Debug)]
pub struct SgdOptimizer {
    params: Vec<Parameter>,
    learning_rate: f32,
    momentum: f32,
    // One buffer per parameter, allocated on the first step that uses momentum.
    momentum_buffers: Vec<Option<Vec<f32>>>,
}

impl SgdOptimizer {
    /// Creates an optimizer over `params`.
    ///
    /// # Errors
    /// `UnsupportedOperation` for a non-positive learning rate or a momentum
    /// outside `[0, 1)`.
    pub fn new(
        params: impl IntoIterator<Item = Parameter>,
        learning_rate: f32,
        momentum: f32,
    ) -> Result<Self, ArchGradError> {
        if !(learning_rate > 0.0) || !(0.0..1.0).contains(&momentum) {
            return Err(ArchGradError::UnsupportedOperation(format!(
                "SGD requires learning_rate > 0 and momentum in [0, 1), got {} and {}",
                learning_rate, momentum
            )));
        }
        let params: Vec<Parameter> = params.into_iter().collect();
        let momentum_buffers = vec![None; params.len()];
        Ok(SgdOptimizer {
            params,
            learning_rate,
            momentum,
            momentum_buffers,
        })
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f32) {
        self.learning_rate = learning_rate;
    }
}

impl Optimizer for SgdOptimizer {
    fn step(&mut self) -> Result<(), ArchGradError> {
        for (param, buffer) in self.params.iter().zip(self.momentum_buffers.iter_mut()) {
            if !param.has_grad() {
                continue;
            }
            let grad = param.grad();
            let update = if self.momentum != 0.0 {
                let velocity = buffer.get_or_insert_with(|| vec![0.0; grad.len()]);
                for (v, g) in velocity.iter_mut().zip(&grad) {
                    *v = self.momentum * *v + g;
                }
                velocity.clone()
            } else {
                grad
            };
            let lr = self.learning_rate;
            param.update_values(|values| {
                for (p, u) in values.iter_mut().zip(&update) {
                    *p -= lr * u;
                }
            });
            param.check_finite().map_err(|e| {
                log::warn!("SGD step produced a non-finite parameter: {}", e);
                e
            })?;
        }
        Ok(())
    }

    fn zero_grad(&mut self) {
        for param in &self.params {
            param.zero_grad();
        }
    }
}

#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;
