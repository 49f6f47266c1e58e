// src/tensor/debug.rs
use crate::tensor::Tensor;
use std::fmt;

const PREVIEW_LEN: usize = 8;

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data.read() {
            Ok(guard) => {
                let preview: Vec<f32> = guard.values.iter().take(PREVIEW_LEN).copied().collect();
                write!(
                    f,
                    "Tensor(name={:?}, shape={:?}, values={:?}{}, has_grad={})",
                    guard.name,
                    guard.shape,
                    preview,
                    if guard.numel() > PREVIEW_LEN { "..." } else { "" },
                    guard.grad.is_some()
                )
            }
            Err(_) => write!(f, "Tensor(Error: RwLock poisoned)"),
        }
    }
}
