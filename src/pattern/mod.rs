//! Graph walks and fused operator patterns
//!
//! This module provides the two graph-level tools the rewriter builds on:
//!
//! 1. A depth-first topological walk over an [`OpGraph`](crate::graph::OpGraph),
//!    optionally driven by a [`TopoVisitor`]
//! 2. Recognition of producer/activation pairs that the inference runtime
//!    executes as a single kernel
//!
//! # Example
//!
//! ```ignore
//! use qat_rewriter::pattern::{dfs_topo_for_each_node, Direction};
//!
//! dfs_topo_for_each_node(&graph, Direction::Forward, |id| {
//!     println!("Visiting: {}", graph.node(id).name());
//!     Ok(())
//! })?;
//! ```

pub mod ops;
pub mod traversal;

// Re-export main types
pub use ops::{fused_consumer, inference_output_node, CONV_RELU, FUSED_PATTERNS};
pub use traversal::{dfs_topo_for_each_node, dfs_topo_walk, Direction, TopoVisitor};
