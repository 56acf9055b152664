//! Advanced graph accessor methods
//!
//! Neighbourhood queries used by traversal and by the rewriter.

use super::context::{OpEdge, OpGraph, OpNode};
use super::maps::NodeId;

impl OpGraph {
    // ========================================================================
    // Edge helpers
    // ========================================================================

    /// Incoming edges of a node
    pub fn in_edges(&self, id: NodeId) -> impl Iterator<Item = &OpEdge> {
        self.node(id).in_edges().iter().map(|&e| self.edge(e))
    }

    /// Outgoing edges of a node
    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = &OpEdge> {
        self.node(id).out_edges().iter().map(|&e| self.edge(e))
    }

    /// The only outgoing edge, if the node has exactly one
    pub fn sole_out_edge(&self, id: NodeId) -> Option<&OpEdge> {
        match self.node(id).out_edges() {
            [only] => Some(self.edge(*only)),
            _ => None,
        }
    }

    /// Human readable edge label for logs
    pub fn edge_name(&self, edge: &OpEdge) -> String {
        format!(
            "edge of {} to {}",
            self.node(edge.src_node()).name(),
            self.node(edge.dst_node()).name()
        )
    }

    // ========================================================================
    // Neighbour helpers
    // ========================================================================

    /// Producers feeding a node
    pub fn in_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.in_edges(id).map(|e| e.src_node())
    }

    /// Consumers fed by a node
    pub fn out_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(id).map(|e| e.dst_node())
    }

    /// Nodes without incoming edges, in job order
    pub fn source_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| n.in_edges().is_empty())
            .map(|n| n.id())
            .collect()
    }

    /// Nodes without outgoing edges, in job order
    pub fn sink_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| n.out_edges().is_empty())
            .map(|n| n.id())
            .collect()
    }

    // ========================================================================
    // Pattern matching helpers
    // ========================================================================

    /// Find user-op nodes by op type
    pub fn find_nodes_by_op(&self, op_type: &str) -> Vec<&OpNode> {
        self.nodes()
            .filter(|n| n.user_op_type_name() == Some(op_type))
            .collect()
    }
}
