//! # QAT Rewriter
//!
//! Quantization-aware training rewrite for job graphs.
//!
//! This crate decides where a fake-quantization marker has to sit in a
//! floating point training job and rewires the consuming operators to read
//! through it. It computes no scales and performs no numeric quantization.
//!
//! ## Features
//!
//! - **Graph View**: Read-only operator graph with per-edge blob and slot tables
//! - **Traversal**: Predicate-driven topological walk, forward or backward
//! - **Marker Insertion**: Entry and exit markers around Int8 operators,
//!   aware of `conv2d` + `relu` inference fusion
//!
//! ## Example
//!
//! ```ignore
//! use qat_rewriter::prelude::*;
//!
//! let job = load_job("train.job.pb")?;
//! let (job, result) = run_pass(job, &QuantAwareTraining::new())?;
//! save_job(&job, "train.qat.pb")?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module declarations
// ============================================================================

pub mod builder;
pub mod error;
pub mod graph;
pub mod io;
pub mod lists;
pub mod pattern;
pub mod proto;
pub mod registry;
pub mod traits;
pub mod transformers;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use qat_rewriter::prelude::*`
pub mod prelude {
    pub use crate::builder::{JobBuilder, UserOpBuilder};
    pub use crate::error::{ErrorCategory, QatResult, TransformError};
    pub use crate::graph::OpGraph;
    pub use crate::io::{load_job, rewrite_file, save_job, RewriteOptions, RewriteStats};
    pub use crate::lists::QatList;
    pub use crate::pattern::{dfs_topo_walk, Direction, TopoVisitor};
    pub use crate::proto::*;
    pub use crate::registry::OpRegistry;
    pub use crate::traits::{JobPass, PassChain};
    pub use crate::transformers::{run_pass, PassResult, QatConfig, QuantAwareTraining};
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{QatResult, TransformError};
pub use traits::JobPass;

// ============================================================================
// Version information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
