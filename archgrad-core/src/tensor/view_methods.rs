use crate::error::ArchGradError;
use crate::tensor::Tensor;

impl Tensor {
    /// Reinterprets the tensor with `shape` in place. The value buffer is not
    /// moved or copied, only shape and strides change.
    ///
    /// This is not recorded on any session; use `Session::reshape` inside a
    /// differentiated computation.
    ///
    /// # Errors
    /// `ShapeMismatch` if the element count differs, `InvalidShape` for an empty
    /// shape or a zero axis.
    pub fn reshape(&self, shape: Vec<usize>) -> Result<(), ArchGradError> {
        self.write_data().set_shape(shape)
    }
}

#[cfg(test)]
#[path = "view_methods_test.rs"]
mod tests;
