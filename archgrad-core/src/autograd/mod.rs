//! Reverse-mode differentiation: the session trace and its backward entries.

pub mod backward_op;
pub mod grad_check;
pub mod session;

pub use backward_op::BackwardOp;
pub use session::{Session, TraceEntry};
