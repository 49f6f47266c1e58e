// src/tensor_data.rs
use std::sync::Arc;

use crate::error::ArchGradError;
use crate::tensor::utils::calculate_strides;

/// Internal storage and metadata for a Tensor.
///
/// It is wrapped in `Arc<RwLock<TensorData>>` by the `Tensor` struct to allow
/// shared ownership (operations and the session trace both hold handles) and
/// interior mutability of the gradient buffer.
#[derive(Debug)]
pub struct TensorData {
    /// Optional label, not required to be unique.
    pub(crate) name: Option<String>,
    /// The shape (dimensions) of the tensor. Rank is always at least 1.
    pub(crate) shape: Vec<usize>,
    /// Row-major strides: the last axis has stride 1.
    pub(crate) strides: Vec<usize>,
    /// Flat value buffer of length `numel()`.
    /// Wrapped in Arc so that reshape-style operations can alias it without copying.
    pub(crate) values: Arc<Vec<f32>>,
    /// Flat gradient buffer, allocated on first access.
    pub(crate) grad: Option<Vec<f32>>,
}

impl TensorData {
    /// Creates a new `TensorData` owning `values` with the given shape.
    ///
    /// # Errors
    /// `InvalidShape` if the shape is empty or any axis is zero, `ShapeMismatch`
    /// if the buffer length does not match the product of the axes.
    pub fn new(values: Vec<f32>, shape: Vec<usize>) -> Result<Self, ArchGradError> {
        Self::with_buffer(Arc::new(values), shape)
    }

    /// Creates a `TensorData` that shares an existing value buffer.
    /// Used by reshape, squeeze and expand.
    pub(crate) fn with_buffer(
        values: Arc<Vec<f32>>,
        shape: Vec<usize>,
    ) -> Result<Self, ArchGradError> {
        validate_shape(&shape)?;
        let numel: usize = shape.iter().product();
        if values.len() != numel {
            return Err(ArchGradError::ShapeMismatch {
                expected: shape,
                actual: vec![values.len()],
                operation: "TensorData::new".to_string(),
            });
        }
        debug_assert!(
            values.iter().all(|v| v.is_finite()),
            "tensor constructed with a non-finite value"
        );

        let strides = calculate_strides(&shape);
        Ok(TensorData {
            name: None,
            shape,
            strides,
            values,
            grad: None,
        })
    }

    /// Number of elements, i.e. the product of all axis sizes.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Linear offset of the element at `indices`.
    ///
    /// # Errors
    /// `OutOfRange` if the index count differs from the rank, or any index is
    /// negative or not below its axis bound.
    pub fn position(&self, indices: &[isize]) -> Result<usize, ArchGradError> {
        let out_of_range = || ArchGradError::OutOfRange {
            index: indices.to_vec(),
            shape: self.shape.clone(),
            operation: "position".to_string(),
        };
        if indices.len() != self.shape.len() {
            return Err(out_of_range());
        }
        let mut offset = 0;
        for (axis, &index) in indices.iter().enumerate() {
            if index < 0 || index as usize >= self.shape[axis] {
                return Err(out_of_range());
            }
            offset += index as usize * self.strides[axis];
        }
        Ok(offset)
    }

    /// Returns the gradient buffer, allocating a zero-filled one on first access.
    pub fn grad_mut(&mut self) -> &mut Vec<f32> {
        let numel = self.numel();
        self.grad.get_or_insert_with(|| vec![0.0; numel])
    }

    /// Replaces shape and strides without touching the value buffer.
    pub(crate) fn set_shape(&mut self, shape: Vec<usize>) -> Result<(), ArchGradError> {
        validate_shape(&shape)?;
        let numel: usize = shape.iter().product();
        if numel != self.numel() {
            return Err(ArchGradError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: shape,
                operation: "reshape".to_string(),
            });
        }
        self.strides = calculate_strides(&shape);
        self.shape = shape;
        Ok(())
    }
}

/// Checks that a shape has rank >= 1 and no zero-sized axis.
pub fn validate_shape(shape: &[usize]) -> Result<(), ArchGradError> {
    if shape.is_empty() || shape.iter().any(|&d| d == 0) {
        return Err(ArchGradError::InvalidShape {
            shape: shape.to_vec(),
        });
    }
    Ok(())
}
