//! Compiles a textual network topology into an executable [`LayerGraph`].
//!
//! ```text
//! A=5C3x3+1(S),B=2x2MP,A~B~10N
//! ```
//!
//! declares a named convolution `A`, a named max-pool `B`, and chains the
//! network input through both into a 10-unit fully-connected layer. Parsing,
//! assembly and normalization run before any tensor is allocated; layers are
//! then instantiated in dependency order and the graph is post-processed with
//! default loss and activation nodes.

mod builder;
pub mod component;
pub mod error;
pub mod graph;
pub mod options;
pub mod parser;
pub mod patterns;

pub use component::ComponentGraph;
pub use error::CompileError;
pub use graph::LayerGraph;
pub use options::CompileOptions;
pub use patterns::LayerSpec;

/// Compiles `architecture` with the default [`CompileOptions`] and the two
/// post-processing switches given.
///
/// # Errors
/// `InvalidArchitecture` for an empty string, or any grammar or layer error.
pub fn compile(
    architecture: &str,
    add_activation_layers: bool,
    add_loss_layer: bool,
) -> Result<LayerGraph, CompileError> {
    let options = CompileOptions::default()
        .with_activation_layers(add_activation_layers)
        .with_loss_layer(add_loss_layer);
    compile_with(architecture, &options)
}

/// Compiles `architecture` under `options`.
pub fn compile_with(architecture: &str, options: &CompileOptions) -> Result<LayerGraph, CompileError> {
    log::debug!("compiling {:?}", architecture);
    let statements = parser::parse(architecture)?;
    let mut components = ComponentGraph::assemble(&statements)?;
    components.normalize()?;
    builder::build(&components, options)
}
