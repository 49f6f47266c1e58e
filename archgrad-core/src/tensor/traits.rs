// src/tensor/traits.rs

use crate::tensor::Tensor;
use std::sync::Arc;

impl Clone for Tensor {
    /// Shallow clone: both handles point at the same values and gradient.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl PartialEq for Tensor {
    /// Two tensors are equal when they have the same shape and values.
    /// Gradients and names are not compared.
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.data, &other.data) {
            return true;
        }
        let self_guard = self.read_data();
        let other_guard = other.read_data();
        self_guard.shape == other_guard.shape && self_guard.values == other_guard.values
    }
}
