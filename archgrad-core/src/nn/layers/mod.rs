//! Concrete layer kinds instantiated by the architecture compiler.

pub mod activation;
pub mod conv;
pub mod dense;
pub mod dropout;
pub mod input;
pub mod loss;
pub mod normalization;
pub mod pool;
pub mod recurrent;
pub mod routing;

pub use activation::{Activation, ActivationKind};
pub use conv::Convolution;
pub use dense::FullyConnected;
pub use dropout::Dropout;
pub use input::Input;
pub use loss::{Loss, LossKind};
pub use normalization::{Lrn, Scale};
pub use pool::{Pool, PoolKind};
pub use recurrent::Recurrent;
pub use routing::{Concat, Split};

/// Formats a float without a trailing `.0` for integral values, as the grammar writes them.
pub(crate) fn format_number(value: f32) -> String {
    if value.fract() == 0.0 && value.abs() < 1e7 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
