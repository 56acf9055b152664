//! Operator graph module
//!
//! This module provides the read-only graph view the rewriter analyses:
//!
//! - [`OpGraph`]: nodes, edges and blob lookups built from a [`JobProto`](crate::proto::JobProto)
//! - [`maps`]: Id types and builders for the lookup tables
//!
//! # Overview
//!
//! Every operator of the job becomes an [`OpNode`]. For each
//! (producer, consumer) pair there is exactly one [`OpEdge`], which records
//! the logical blobs flowing along it and, for each blob, the consumer input
//! slots bound to it.
//!
//! # Example
//!
//! ```ignore
//! use qat_rewriter::graph::OpGraph;
//!
//! let graph = OpGraph::new(&job)?;
//!
//! for node in graph.nodes() {
//!     for edge in graph.out_edges(node.id()) {
//!         println!("{} carries {:?}", graph.edge_name(edge), edge.lbis());
//!     }
//! }
//! ```
//!
//! # Maps
//!
//! | Map | Description |
//! |-----|-------------|
//! | `node_index_map` | op_name → NodeId |
//! | `producer_map` | lbn → producer NodeId |
//! | `placement_map` | op_name → ParallelConf |
//! | `blob_desc_map` | lbn → BlobDescProto |

pub mod accessors;
pub mod context;
pub mod maps;

// Re-export main types
pub use context::{OpEdge, OpGraph, OpNode};
pub use maps::{BlobDescMap, EdgeId, EdgeList, NodeId, NodeIndexMap, PlacementMap, ProducerMap};
