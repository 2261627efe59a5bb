//! Error types for bridge generation

use isobridge_core::CoreError;
use thiserror::Error;

/// Result type alias for generation operations
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Error type for a generation round
///
/// Problems with the annotated declarations themselves are diagnostics and
/// never surface here. These variants cover failures of the round's
/// collaborators.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// Reading input or writing output failed
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A boundary kind name could not be recognized
    #[error("unknown boundary kind: {0}")]
    UnknownBoundary(String),

    /// The writer rejected a generated file
    #[error("failed to emit `{path}`: {source}")]
    EmitFailed {
        path: String,
        #[source]
        source: CoreError,
    },
}

impl CodegenError {
    /// Whether the failure happened while handing files to the writer
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            CodegenError::EmitFailed { .. } | CodegenError::Core(CoreError::WriteFailed { .. })
        )
    }
}
