use archgrad_core::ArchGradError;
use thiserror::Error;

/// Error type for parsing, assembling and instantiating an architecture.
///
/// Grammar errors are raised before any tensor is allocated.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum CompileError {
    #[error("Invalid architecture: {0}")]
    InvalidArchitecture(String),

    #[error("Malformed architecture {architecture:?}: {reason}")]
    MalformedArchitecture { architecture: String, reason: String },

    #[error("Vertex {name:?} is defined more than once")]
    DuplicateVertex { name: String },

    #[error("Edge {from} -> {to} is declared more than once")]
    DuplicateEdge { from: String, to: String },

    #[error("Unrecognized layer specification {0:?}")]
    UnrecognizedArchitecture(String),

    #[error("Architecture contains a cycle through {key}")]
    CyclicArchitecture { key: String },

    #[error("Layer {key} could not be built: {source}")]
    Layer {
        key: String,
        #[source]
        source: ArchGradError,
    },

    #[error("Tensor error: {0}")]
    Tensor(#[from] ArchGradError),
}

impl CompileError {
    pub(crate) fn malformed(architecture: &str, reason: impl Into<String>) -> Self {
        CompileError::MalformedArchitecture {
            architecture: architecture.to_string(),
            reason: reason.into(),
        }
    }
}
