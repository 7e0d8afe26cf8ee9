//! Error types for mosaic-composite.

use mosaic_topology::TopologyError;
use thiserror::Error;

use crate::Handle;

/// Result type for composite network operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing or persisting a composite network.
#[derive(Debug, Error)]
pub enum Error {
    /// Stale or foreign handle, or a row/column/point outside the control net.
    #[error("invalid index: {0}")]
    InvalidIndex(String),

    /// The requested adjacency slot is already occupied.
    #[error("node {node} is already connected towards {direction}")]
    AlreadyConnected {
        node: Handle,
        direction: &'static str,
    },

    /// The adjacency graph does not support the operation (missing back
    /// link, incompatible slots, runaway vertex walk).
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// The evaluator could not regenerate a node's image.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// Malformed text mesh input.
    #[error("parse error at token {token}: {message}")]
    Parse { token: usize, message: String },

    /// I/O error while reading or writing a mesh file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<TopologyError> for Error {
    fn from(err: TopologyError) -> Self {
        match err {
            TopologyError::InvalidIndex { .. } | TopologyError::InvalidPointIndex { .. } => {
                Error::InvalidIndex(err.to_string())
            }
            other => Error::InvalidTopology(other.to_string()),
        }
    }
}
