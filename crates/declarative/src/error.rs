//! Error types for declaration graphs.

use thiserror::Error;

/// Errors that can occur while building, ordering or evaluating a graph.
#[derive(Debug, Error)]
pub enum Error {
    /// Two declarations share the same logical name
    #[error("duplicate declaration: {name}")]
    DuplicateName {
        /// Logical name that was declared twice
        name: String,
    },

    /// An input references a resource that was never declared
    #[error("'{from}' references undeclared resource '{to}'")]
    UnknownReference {
        /// Declaration (or export) holding the reference
        from: String,
        /// Name that could not be found
        to: String,
    },

    /// The graph cannot be ordered
    #[error("dependency cycle among: {}", .0.join(", "))]
    Cycle(Vec<String>),

    /// A plan was requested for a declaration that does not exist
    #[error("unknown target: {0}")]
    UnknownTarget(String),

    /// No resolved value was reported for a resource
    #[error("outputs of '{resource}' have not been resolved")]
    Unresolved {
        /// Resource whose outputs are missing
        resource: String,
    },

    /// The resolved value does not contain the referenced path
    #[error("'{resource}' has no output at '{path}'")]
    MissingOutput {
        /// Resource being read
        resource: String,
        /// Property path that was not found
        path: String,
    },

    /// A transform received a value of the wrong shape
    #[error("{transform} expects {expected}, got {found}")]
    TransformType {
        /// Transform name
        transform: &'static str,
        /// What the transform accepts
        expected: &'static str,
        /// JSON type that was supplied
        found: &'static str,
    },

    /// Base64 payload could not be decoded
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are not text
    #[error("decoded payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result alias for graph operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error comes from graph structure rather than evaluation.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::DuplicateName { .. }
                | Self::UnknownReference { .. }
                | Self::Cycle(_)
                | Self::UnknownTarget(_)
        )
    }
}
