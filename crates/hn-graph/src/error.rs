//! Graph-specific error types.

use hn_core::{AssetId, CoreError};

pub type GraphResult<T> = Result<T, GraphError>;

/// Model construction, encoding and decoding errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Id was never assigned a dense index.
    IdNotFound { id: AssetId },

    /// The same id was added twice.
    DuplicateId { id: AssetId },

    /// An id is reported as both a node and a link.
    AmbiguousAsset { id: AssetId },

    /// A count disagrees with the number of items actually iterated.
    CountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A link has no endpoints in the topology.
    MissingEndpoints { link: AssetId },

    /// A link endpoint is not a node of the same snapshot.
    DanglingEndpoint { link: AssetId, node: AssetId },

    /// A node lists an incident link that is not part of the snapshot.
    UnknownIncidentLink { node: AssetId, link: AssetId },

    /// A type column holds a tag with no matching asset type.
    UnknownTypeTag { what: &'static str, tag: u8 },

    /// Buffers are structurally inconsistent.
    MalformedBuffer { what: &'static str, detail: String },

    /// Topology buffers were encoded against a different asset index.
    SnapshotMismatch,

    /// Low-level column error.
    Buffer(CoreError),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::IdNotFound { id } => write!(f, "Asset {} not found in index map", id),
            GraphError::DuplicateId { id } => write!(f, "Asset {} was added more than once", id),
            GraphError::AmbiguousAsset { id } => {
                write!(f, "Asset {} is registered as both a node and a link", id)
            }
            GraphError::CountMismatch {
                what,
                expected,
                actual,
            } => write!(
                f,
                "Expected {} {} but iterated {}",
                expected, what, actual
            ),
            GraphError::MissingEndpoints { link } => {
                write!(f, "Link {} has no endpoints in the topology", link)
            }
            GraphError::DanglingEndpoint { link, node } => {
                write!(f, "Link {} refers to non-existent node {}", link, node)
            }
            GraphError::UnknownIncidentLink { node, link } => {
                write!(f, "Node {} lists unknown incident link {}", node, link)
            }
            GraphError::UnknownTypeTag { what, tag } => {
                write!(f, "Unknown {} type tag {}", what, tag)
            }
            GraphError::MalformedBuffer { what, detail } => {
                write!(f, "Malformed {} buffer: {}", what, detail)
            }
            GraphError::SnapshotMismatch => write!(
                f,
                "Topology buffers belong to a different asset index snapshot"
            ),
            GraphError::Buffer(err) => write!(f, "Buffer error: {}", err),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::Buffer(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoreError> for GraphError {
    fn from(err: CoreError) -> Self {
        GraphError::Buffer(err)
    }
}
