// src/tensor/mod.rs

use crate::error::ArchGradError;
use crate::tensor_data::TensorData;
use std::sync::{Arc, RwLock};

mod autograd_methods;
mod debug;
mod traits;
pub mod create;
mod view_methods;

pub mod utils;

// Re-export creation functions to make them public
pub use create::{full, randn, uniform, zeros, zeros_like};

/// Represents a named, shaped, multi-dimensional f32 tensor.
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally to allow for:
/// 1.  **Shared Ownership:** the producing layer, the consuming operations and the
///     session trace all hold cheap clones of the same tensor.
/// 2.  **Interior Mutability:** the gradient buffer is allocated lazily and
///     accumulated into during the backward replay through an immutable handle.
pub struct Tensor {
    /// Arc for shared ownership, RwLock for interior mutability of TensorData.
    pub(crate) data: Arc<RwLock<TensorData>>,
}

/// Stable identity of a tensor, derived from the address of its shared data.
/// Clones of the same tensor share a `NodeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl Tensor {
    /// Creates a new tensor from row-major `values` and `shape`.
    ///
    /// # Errors
    /// `InvalidShape` if the shape is empty or has a zero axis, `ShapeMismatch`
    /// if `values.len()` is not the product of the axes.
    pub fn new(values: Vec<f32>, shape: Vec<usize>) -> Result<Self, ArchGradError> {
        Ok(Self::from_data(TensorData::new(values, shape)?))
    }

    pub(crate) fn from_data(tensor_data: TensorData) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        }
    }

    /// Attaches a label. Names are informational and need not be unique.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.write_data().name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<String> {
        self.read_data().name.clone()
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns a clone of the tensor's row-major strides.
    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Returns a copy of the flat value buffer.
    pub fn values(&self) -> Vec<f32> {
        self.read_data().values.as_ref().clone()
    }

    pub(crate) fn values_arc(&self) -> Arc<Vec<f32>> {
        Arc::clone(&self.read_data().values)
    }

    /// Linear offset of the element at `indices`; see [`TensorData::position`].
    pub fn position(&self, indices: &[isize]) -> Result<usize, ArchGradError> {
        self.read_data().position(indices)
    }

    /// Reads a single element.
    pub fn get(&self, indices: &[isize]) -> Result<f32, ArchGradError> {
        let guard = self.read_data();
        let offset = guard.position(indices)?;
        Ok(guard.values[offset])
    }

    /// Mutates the values in place. Buffers shared with reshaped views are
    /// copied first, so only this tensor observes the change.
    pub fn update_values<F>(&self, f: F)
    where
        F: FnOnce(&mut [f32]),
    {
        let mut guard = self.write_data();
        f(Arc::make_mut(&mut guard.values).as_mut_slice());
    }

    /// True when both tensors alias the same value buffer.
    pub fn shares_values_with(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.read_data().values, &other.read_data().values)
    }

    /// Identity of the underlying tensor node.
    pub fn node_id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.data) as *const () as usize)
    }

    /// Fails with `NonFiniteValue` on the first NaN or infinite element.
    pub fn check_finite(&self) -> Result<(), ArchGradError> {
        let guard = self.read_data();
        match guard.values.iter().position(|v| !v.is_finite()) {
            Some(position) => Err(ArchGradError::NonFiniteValue {
                name: guard.name.clone(),
                position,
                value: guard.values[position],
            }),
            None => Ok(()),
        }
    }

    /// Acquires a read lock on the tensor's data.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }
}
