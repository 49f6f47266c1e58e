use crate::tensor::Tensor;
use std::fmt;
use std::ops::Deref;

/// A trainable tensor owned by a layer.
///
/// The wrapper only marks intent: the optimizer walks `Parameter`s, and the
/// underlying tensor is reachable through `Deref`. Cloning is shallow, so a
/// clone updates the same values the layer reads.
pub struct Parameter(Tensor);

impl Parameter {
    /// Wraps `tensor`, labelling it `name`.
    pub fn new(tensor: Tensor, name: impl Into<String>) -> Self {
        Parameter(tensor.with_name(name))
    }

    /// Consumes the Parameter and returns the underlying Tensor.
    pub fn into_inner(self) -> Tensor {
        self.0
    }

    /// Overwrites every value with `value`.
    pub fn fill(&self, value: f32) {
        self.0.update_values(|values| values.fill(value));
    }
}

impl Deref for Parameter {
    type Target = Tensor;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter({:?})", self.0)
    }
}

impl Clone for Parameter {
    fn clone(&self) -> Self {
        Parameter(self.0.clone())
    }
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;
