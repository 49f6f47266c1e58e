//! Optimizers for training layer graphs.
//!
//! This module provides the `Optimizer` trait and plain stochastic gradient
//! descent with optional momentum.

pub mod optimizer_trait;
pub mod sgd;

pub use optimizer_trait::Optimizer;
pub use sgd::SgdOptimizer;
