// archgrad-core/src/nn/mod.rs
// Layers, parameters and initializers.

pub mod init;
pub mod layer;
pub mod layers;
pub mod parameter;

pub use layer::{Layer, LayerKind};
pub use layers::{ActivationKind, LossKind};
pub use parameter::Parameter;
