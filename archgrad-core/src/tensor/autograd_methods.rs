use crate::error::ArchGradError;
use crate::tensor::Tensor;

impl Tensor {
    /// Returns a copy of the gradient, allocating a zero-filled buffer on first access.
    pub fn grad(&self) -> Vec<f32> {
        self.write_data().grad_mut().clone()
    }

    /// True once the gradient buffer has been allocated.
    pub fn has_grad(&self) -> bool {
        self.read_data().grad.is_some()
    }

    /// Adds `delta` elementwise into the gradient buffer.
    ///
    /// This is the only way backward replay touches a gradient, so a tensor
    /// consumed by several operations ends up holding the sum of their contributions.
    pub fn accumulate_grad(&self, delta: &[f32]) -> Result<(), ArchGradError> {
        let mut guard = self.write_data();
        if delta.len() != guard.numel() {
            return Err(ArchGradError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: vec![delta.len()],
                operation: "accumulate_grad".to_string(),
            });
        }
        for (g, d) in guard.grad_mut().iter_mut().zip(delta) {
            *g += *d;
        }
        Ok(())
    }

    /// Runs `f` against the (lazily allocated) gradient buffer.
    pub fn with_grad_mut<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut [f32]) -> R,
    {
        let mut guard = self.write_data();
        f(guard.grad_mut().as_mut_slice())
    }

    /// Drops the gradient buffer; the next access reallocates it as zeros.
    pub fn zero_grad(&self) {
        self.write_data().grad = None;
    }
}

#[cfg(test)]
#[path = "autograd_methods_test.rs"]
mod tests;
