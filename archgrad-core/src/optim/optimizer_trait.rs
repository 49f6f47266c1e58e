use crate::error::ArchGradError;

/// Trait defining the common interface for all optimizers.
///
/// Optimizers update the parameters they were given from the gradients the
/// last finalized session accumulated into them.
pub trait Optimizer {
    /// Performs a single optimization step.
    fn step(&mut self) -> Result<(), ArchGradError>;

    /// Clears the gradients of all managed parameters. Call before the next
    /// forward pass: gradients otherwise keep accumulating across sessions.
    fn zero_grad(&mut self);
}
