//! Job protocol buffer types
//!
//! Messages are declared directly with `prost` derives in [`job`].
//! Additional extension methods are provided in the `extensions` submodule.

/// Job description messages
#[allow(missing_docs)]
pub mod job;

// Re-export commonly used types at module level
pub use job::{
    BlobDescProto, DataType, InputOpConf, JobProto, ListString, OperatorConf, ParallelConf,
    PlacementGroup, UserOpConf, VariableOpConf,
};

// Re-export submodules for nested types
pub use job::operator_conf;

/// Extension methods for job protobuf types
pub mod extensions;
