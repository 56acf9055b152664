//! Error types for qat-rewriter
//!
//! Every failure the rewriter can hit is a [`TransformError`]. Variants are
//! grouped into [`ErrorCategory`] so callers can tell a bad configuration apart
//! from an internal consistency break without matching every variant.

use thiserror::Error;

use crate::proto::DataType;

/// Coarse classification of a [`TransformError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// User-facing configuration or unsupported topology
    Configuration,
    /// Logic bug inside the rewriter or a broken mutation contract
    Consistency,
    /// Malformed input graph
    Graph,
    /// Reading, writing or validating job files
    Io,
    /// Invariant that should be impossible to break
    Internal,
}

/// Main error type for job rewriting
#[derive(Error, Debug)]
pub enum TransformError {
    /// The job's default data type is not the one the pass quantizes from
    #[error("Default data type mismatch: expected {expected:?}, got {actual:?}")]
    DataTypeMismatch {
        /// Data type the pass was configured for
        expected: DataType,
        /// Data type declared by the job
        actual: DataType,
    },

    /// A classification list names an op type the registry does not know
    #[error("Cannot find {op_type} of {list} list in op registry")]
    UnregisteredOpType {
        /// Name of the list holding the entry
        list: &'static str,
        /// Offending op type name
        op_type: String,
    },

    /// Two edges carrying the same logical blob disagree about its producer
    #[error("Logical blob {lbn} has inconsistent producers: {expected} vs {actual}")]
    InconsistentProducer {
        /// Logical blob name
        lbn: String,
        /// Producer of the first edge in the group
        expected: String,
        /// Producer of the conflicting edge
        actual: String,
    },

    /// Edge shape the rewriter does not handle (multi-blob edge, multi-slot binding)
    #[error("Unsupported edge: {0}")]
    UnsupportedEdge(String),

    /// A node was inserted into the downstream white set twice
    #[error("Node inserted into downstream white set twice: {0}")]
    DuplicateWhiteNode(String),

    /// An operator conf was replaced twice within one builder
    #[error("Operator conf mutated more than once: {0}")]
    DuplicateMutation(String),

    /// An added operator clashes with an existing one
    #[error("Operator already exists: {0}")]
    DuplicateOp(String),

    /// A blob desc is declared for a logical blob that already has one
    #[error("Logical blob desc already declared: {0}")]
    DuplicateBlobDesc(String),

    /// A mutation targets an operator that is not in the job
    #[error("Unknown operator: {0}")]
    UnknownOp(String),

    /// Structural problem in the input graph
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// No declared blob descriptor for a logical blob
    #[error("Logical blob desc not found: {0}")]
    MissingBlobDesc(String),

    /// Logical or input blob name that does not follow the naming scheme
    #[error("Invalid blob name: {0}")]
    InvalidBlobName(String),

    /// Operator not covered by any placement group
    #[error("No placement for operator: {0}")]
    MissingPlacement(String),

    /// Job validation failed
    #[error("Job validation failed: {0}")]
    ValidationFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Protobuf decode error
    #[error("Protobuf decode error: {0}")]
    ProtoDecode(#[from] prost::DecodeError),

    /// Protobuf encode error
    #[error("Protobuf encode error: {0}")]
    ProtoEncode(#[from] prost::EncodeError),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransformError {
    /// Category this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DataTypeMismatch { .. }
            | Self::UnregisteredOpType { .. }
            | Self::InconsistentProducer { .. }
            | Self::UnsupportedEdge(_) => ErrorCategory::Configuration,
            Self::DuplicateWhiteNode(_)
            | Self::DuplicateMutation(_)
            | Self::DuplicateOp(_)
            | Self::DuplicateBlobDesc(_)
            | Self::UnknownOp(_) => ErrorCategory::Consistency,
            Self::InvalidGraph(_)
            | Self::MissingBlobDesc(_)
            | Self::InvalidBlobName(_)
            | Self::MissingPlacement(_) => ErrorCategory::Graph,
            Self::ValidationFailed(_)
            | Self::Io(_)
            | Self::ProtoDecode(_)
            | Self::ProtoEncode(_) => ErrorCategory::Io,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Result type alias for rewriter operations
pub type QatResult<T> = Result<T, TransformError>;
