use thiserror::Error;

/// Error type for tensors, sessions and operations.
///
/// Every variant carries the name of the operation that failed and the offending
/// shape or axis. Construction errors are raised eagerly by the forward call, never
/// deferred into the backward replay.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ArchGradError {
    #[error("Invalid shape {shape:?}: every axis must be positive and rank must be at least 1")]
    InvalidShape { shape: Vec<usize> },

    #[error("Index {index:?} out of range for shape {shape:?} during {operation}")]
    OutOfRange {
        index: Vec<isize>,
        shape: Vec<usize>,
        operation: String,
    },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Negative axis index {axis} passed to {operation}")]
    NegativeAxisIndex { axis: isize, operation: String },

    #[error("Axis {axis} out of range for rank {rank} during {operation}")]
    AxisOutOfRange {
        axis: usize,
        rank: usize,
        operation: String,
    },

    #[error("Cannot split axis of length {length} into {count} equal parts during {operation}")]
    IndivisibleSplit {
        length: usize,
        count: usize,
        operation: String,
    },

    #[error("Axis {axis} of shape {shape:?} has size {size}, expected 1")]
    NotUnitAxis {
        axis: usize,
        size: usize,
        shape: Vec<usize>,
    },

    #[error("{operation} on shape {shape:?} would produce a tensor of rank < 1")]
    RankTooLow { shape: Vec<usize>, operation: String },

    #[error("Operation {operation} requires at least one input tensor")]
    EmptyTensorList { operation: String },

    #[error("Session has already been finalized; create or reset a session before running {operation}")]
    SessionFinalized { operation: String },

    #[error("Tensor {name:?} holds a non-finite value {value} at position {position}")]
    NonFiniteValue {
        name: Option<String>,
        position: usize,
        value: f32,
    },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
