//! Edge selection
//!
//! Picks the edges that cross into or out of quantized territory around each
//! Int8 node.

use indexmap::IndexSet;

use crate::graph::{EdgeId, OpEdge, OpGraph};
use crate::pattern::inference_output_node;

use super::config::QatConfig;
use super::rewrite::is_fake_quant_marker;
use super::white_set::WhiteSet;

/// Edge already touches a marker and needs no further one
fn touches_marker(graph: &OpGraph, edge: &OpEdge) -> bool {
    is_fake_quant_marker(graph.node(edge.src_node()).op_conf())
        || is_fake_quant_marker(graph.node(edge.dst_node()).op_conf())
}

fn mark(graph: &OpGraph, marked: &mut IndexSet<EdgeId>, edge: &OpEdge, reason: &'static str) {
    if touches_marker(graph, edge) {
        return;
    }
    if marked.insert(edge.id()) {
        tracing::trace!(edge = %graph.edge_name(edge), reason, "marked");
    } else {
        tracing::trace!(edge = %graph.edge_name(edge), reason, "already marked");
    }
}

/// Edges needing a fake-quant marker, in discovery order
///
/// For every Int8 node: incoming edges whose source is outside `white`, and
/// every outgoing edge of the node's inference output.
pub fn select_marked_edges(graph: &OpGraph, config: &QatConfig, white: &WhiteSet) -> IndexSet<EdgeId> {
    let mut marked = IndexSet::new();

    for node in graph.nodes() {
        let is_int8 = node
            .user_op_type_name()
            .is_some_and(|op_type| config.int8_list.contains(op_type));
        if !is_int8 {
            continue;
        }

        for edge in graph.in_edges(node.id()) {
            if !white.contains(edge.src_node()) {
                mark(graph, &mut marked, edge, "entry");
            }
        }

        let output = inference_output_node(graph, node.id());
        for edge in graph.out_edges(output) {
            mark(graph, &mut marked, edge, "exit");
        }
    }

    marked
}
